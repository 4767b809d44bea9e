//! Database queries for articles.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::article::{self, ActiveModel, Entity as Article};
use crate::entity::{article_tag, user};
use crate::error::{AppError, AppResult};
use crate::models::{ArticleStatus, ArticleSummary, AuthorInfo, ListArticlesQuery, Page, non_blank};

use super::{DbPool, like_pattern};

/// Default page size for article lists.
pub const DEFAULT_ARTICLE_LIMIT: u64 = 10;

/// Validated, normalized article fields ready for storage.
#[derive(Debug, Clone)]
pub struct ArticleFields {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image_key: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub is_published: bool,
}

/// `published_at` after a publish/unpublish: stamped on the first publish, then kept.
pub fn next_published_at(
    current: Option<DateTime<Utc>>,
    publish: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match current {
        Some(at) => Some(at),
        None if publish => Some(now),
        None => None,
    }
}

impl DbPool {
    /// List articles. `published_only` restricts to the public view and ignores `status`.
    pub async fn list_articles(
        &self,
        query: &ListArticlesQuery,
        published_only: bool,
    ) -> AppResult<(Vec<article::Model>, u64, Page)> {
        let page = Page::new(query.limit, query.offset, DEFAULT_ARTICLE_LIMIT);
        let mut select = Article::find().filter(article::Column::DeletedAt.is_null());

        let status = if published_only {
            Some(ArticleStatus::Published)
        } else {
            query.status
        };
        match status {
            Some(ArticleStatus::Published) => {
                select = select.filter(article::Column::IsPublished.eq(true));
            }
            Some(ArticleStatus::Draft) => {
                select = select.filter(article::Column::IsPublished.eq(false));
            }
            None => {}
        }

        if let Some(search) = non_blank(query.search.clone()) {
            select = select.filter(Expr::cust_with_values(
                "(articles.title ILIKE $1 OR articles.summary ILIKE $1)",
                [like_pattern(&search)],
            ));
        }

        if let Some(tag_slug) = non_blank(query.tag.clone()) {
            select = select.filter(Expr::cust_with_values(
                "articles.id IN (SELECT at.article_id FROM article_tags at \
                 JOIN tags t ON t.id = at.tag_id \
                 WHERE t.slug = $1 AND t.deleted_at IS NULL)",
                [tag_slug],
            ));
        }

        let total = select.clone().count(self.connection()).await?;

        let select = if published_only {
            select.order_by_desc(article::Column::PublishedAt)
        } else {
            select.order_by_desc(article::Column::UpdatedAt)
        };

        let articles = select
            .order_by_desc(article::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.connection())
            .await?;

        Ok((articles, total, page))
    }

    /// Get an active article (draft or published) by ID.
    pub async fn get_article(&self, id: Uuid) -> AppResult<Option<article::Model>> {
        let result = Article::find_by_id(id)
            .filter(article::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;
        Ok(result)
    }

    /// Get a published article by slug.
    pub async fn get_published_article_by_slug(
        &self,
        slug: &str,
    ) -> AppResult<Option<article::Model>> {
        let result = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::IsPublished.eq(true))
            .filter(article::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;
        Ok(result)
    }

    /// Whether an active article other than `exclude` uses this slug.
    pub async fn article_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let mut select = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::DeletedAt.is_null());
        if let Some(id) = exclude {
            select = select.filter(article::Column::Id.ne(id));
        }
        Ok(select.count(self.connection()).await? > 0)
    }

    /// Insert an article and its tag links.
    pub async fn insert_article(
        &self,
        fields: ArticleFields,
        author_id: Option<Uuid>,
    ) -> AppResult<article::Model> {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let txn = self.connection().begin().await?;

        let model = ActiveModel {
            id: Set(id),
            title: Set(fields.title),
            slug: Set(fields.slug),
            summary: Set(fields.summary),
            content: Set(fields.content),
            cover_image_key: Set(fields.cover_image_key),
            is_published: Set(fields.is_published),
            published_at: Set(next_published_at(None, fields.is_published, now)),
            author_id: Set(author_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        let inserted = model.insert(&txn).await?;

        replace_article_tags(&txn, id, &fields.tag_ids).await?;

        txn.commit().await?;
        Ok(inserted)
    }

    /// Replace every editable field of an article, including its tag set.
    pub async fn update_article(&self, id: Uuid, fields: ArticleFields) -> AppResult<article::Model> {
        let existing = self
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {}", id)))?;

        let now = Utc::now();
        let published_at = next_published_at(existing.published_at, fields.is_published, now);
        let txn = self.connection().begin().await?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(fields.title);
        active.slug = Set(fields.slug);
        active.summary = Set(fields.summary);
        active.content = Set(fields.content);
        active.cover_image_key = Set(fields.cover_image_key);
        active.is_published = Set(fields.is_published);
        active.published_at = Set(published_at);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        replace_article_tags(&txn, id, &fields.tag_ids).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Publish or unpublish an article.
    pub async fn set_article_published(&self, id: Uuid, publish: bool) -> AppResult<article::Model> {
        let existing = self
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {}", id)))?;

        let now = Utc::now();
        let published_at = next_published_at(existing.published_at, publish, now);

        let mut active: ActiveModel = existing.into();
        active.is_published = Set(publish);
        active.published_at = Set(published_at);
        active.updated_at = Set(now);

        Ok(active.update(self.connection()).await?)
    }

    /// Soft-delete an article. Returns false if it was not active.
    pub async fn delete_article(&self, id: Uuid) -> AppResult<bool> {
        let Some(existing) = self.get_article(id).await? else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut active: ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(self.connection()).await?;

        Ok(true)
    }

    /// Count published, active articles.
    pub async fn count_published_articles(&self) -> AppResult<u64> {
        let count = Article::find()
            .filter(article::Column::IsPublished.eq(true))
            .filter(article::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        Ok(count)
    }

    /// Attach tags and authors to a batch of articles, keeping their order.
    pub async fn article_summaries(
        &self,
        articles: &[article::Model],
    ) -> AppResult<Vec<ArticleSummary>> {
        let ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();
        let mut tags = self.tags_for_articles(&ids).await?;
        let authors = self.authors_for_articles(articles).await?;

        Ok(articles
            .iter()
            .map(|a| {
                let author = a.author_id.and_then(|id| authors.get(&id).cloned());
                ArticleSummary::from_parts(a, tags.remove(&a.id).unwrap_or_default(), author)
            })
            .collect())
    }

    async fn authors_for_articles(
        &self,
        articles: &[article::Model],
    ) -> AppResult<HashMap<Uuid, AuthorInfo>> {
        let author_ids: Vec<Uuid> = super::dedup_ids(
            &articles.iter().filter_map(|a| a.author_id).collect::<Vec<_>>(),
        );
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(self.connection())
            .await?;

        Ok(users.into_iter().map(|u| (u.id, AuthorInfo::from(u))).collect())
    }
}

/// Replace the tag links of an article inside the caller's transaction.
async fn replace_article_tags<C: ConnectionTrait>(
    conn: &C,
    article_id: Uuid,
    tag_ids: &[Uuid],
) -> AppResult<()> {
    article_tag::Entity::delete_many()
        .filter(article_tag::Column::ArticleId.eq(article_id))
        .exec(conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let links = tag_ids.iter().map(|tag_id| article_tag::ActiveModel {
        article_id: Set(article_id),
        tag_id: Set(*tag_id),
    });
    article_tag::Entity::insert_many(links).exec(conn).await?;

    Ok(())
}
