//! Migration: Create articles and article_tags tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE articles (
                    id UUID PRIMARY KEY,
                    title VARCHAR(200) NOT NULL,
                    slug VARCHAR(220) NOT NULL,
                    summary VARCHAR(500),
                    content TEXT NOT NULL,
                    cover_image_key VARCHAR(300),
                    is_published BOOLEAN NOT NULL DEFAULT FALSE,
                    published_at TIMESTAMPTZ,
                    author_id UUID REFERENCES users(id) ON DELETE SET NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE UNIQUE INDEX idx_articles_slug_active
                    ON articles(slug)
                    WHERE deleted_at IS NULL;

                -- Public listing: newest published first
                CREATE INDEX idx_articles_published
                    ON articles(published_at DESC)
                    WHERE is_published AND deleted_at IS NULL;

                CREATE INDEX idx_articles_author_id ON articles(author_id);

                CREATE TRIGGER update_articles_updated_at
                    BEFORE UPDATE ON articles
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE article_tags (
                    article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                    tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                    PRIMARY KEY (article_id, tag_id)
                );

                CREATE INDEX idx_article_tags_tag_id ON article_tags(tag_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS article_tags CASCADE;
                DROP TRIGGER IF EXISTS update_articles_updated_at ON articles;
                DROP TABLE IF EXISTS articles CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
