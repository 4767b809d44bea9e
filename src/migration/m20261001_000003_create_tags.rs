//! Migration: Create tags table.

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
                CREATE TABLE tags (
                    id UUID PRIMARY KEY,
                    name VARCHAR(64) NOT NULL,
                    slug VARCHAR(80) NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                -- Names compare case-insensitively among active tags
                CREATE UNIQUE INDEX idx_tags_name_active
                    ON tags(LOWER(name))
                    WHERE deleted_at IS NULL;

                CREATE UNIQUE INDEX idx_tags_slug_active
                    ON tags(slug)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_tags_updated_at
                    BEFORE UPDATE ON tags
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
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
                DROP TRIGGER IF EXISTS update_tags_updated_at ON tags;
                DROP TABLE IF EXISTS tags CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
