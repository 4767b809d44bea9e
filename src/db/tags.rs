//! Database queries for tags.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{article, article_tag};
use crate::entity::tag::{self, ActiveModel, Entity as Tag};
use crate::error::{AppError, AppResult};
use crate::models::{TagResponse, TagWithCount};

use super::DbPool;

impl DbPool {
    /// All active tags by name, with published-article counts.
    pub async fn list_tags_with_counts(&self) -> AppResult<Vec<TagWithCount>> {
        let tags = Tag::find()
            .filter(tag::Column::DeletedAt.is_null())
            .order_by_asc(tag::Column::Name)
            .all(self.connection())
            .await?;

        let counts: HashMap<Uuid, i64> = article_tag::Entity::find()
            .select_only()
            .column(article_tag::Column::TagId)
            .column_as(article_tag::Column::ArticleId.count(), "article_count")
            .join(JoinType::InnerJoin, article_tag::Relation::Article.def())
            .filter(article::Column::IsPublished.eq(true))
            .filter(article::Column::DeletedAt.is_null())
            .group_by(article_tag::Column::TagId)
            .into_tuple::<(Uuid, i64)>()
            .all(self.connection())
            .await?
            .into_iter()
            .collect();

        Ok(tags
            .into_iter()
            .map(|t| {
                let article_count = counts.get(&t.id).copied().unwrap_or(0).max(0) as u64;
                TagWithCount {
                    tag: t.into(),
                    article_count,
                }
            })
            .collect())
    }

    /// Get an active tag by ID.
    pub async fn get_tag(&self, id: Uuid) -> AppResult<Option<tag::Model>> {
        let result = Tag::find_by_id(id)
            .filter(tag::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;
        Ok(result)
    }

    /// Whether an active tag other than `exclude` already uses this name or slug.
    pub async fn tag_name_taken(
        &self,
        name: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        use sea_orm::Condition;
        use sea_orm::sea_query::Expr;

        let mut select = Tag::find()
            .filter(tag::Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(Expr::cust_with_values(
                        "LOWER(tags.name) = LOWER($1)",
                        [name.to_string()],
                    ))
                    .add(tag::Column::Slug.eq(slug)),
            );

        if let Some(id) = exclude {
            select = select.filter(tag::Column::Id.ne(id));
        }

        Ok(select.count(self.connection()).await? > 0)
    }

    /// Number of the given ids that are active tags.
    pub async fn count_active_tags(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count = Tag::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .filter(tag::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        Ok(count)
    }

    pub async fn insert_tag(&self, name: &str, slug: &str) -> AppResult<tag::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_tag(&self, id: Uuid, name: &str, slug: &str) -> AppResult<tag::Model> {
        let existing = self
            .get_tag(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.slug = Set(slug.to_string());
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.connection()).await?)
    }

    /// Soft-delete a tag and detach it from every article.
    pub async fn delete_tag(&self, id: Uuid) -> AppResult<bool> {
        let Some(existing) = self.get_tag(id).await? else {
            return Ok(false);
        };

        let txn = self.connection().begin().await?;

        article_tag::Entity::delete_many()
            .filter(article_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        let mut active: ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    /// Active tags per article, sorted by name.
    pub async fn tags_for_articles(
        &self,
        article_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<TagResponse>>> {
        let mut map: HashMap<Uuid, Vec<TagResponse>> = HashMap::new();
        if article_ids.is_empty() {
            return Ok(map);
        }

        let rows = article_tag::Entity::find()
            .filter(article_tag::Column::ArticleId.is_in(article_ids.to_vec()))
            .find_also_related(Tag)
            .all(self.connection())
            .await?;

        for (link, tag) in rows {
            if let Some(tag) = tag.filter(|t| t.deleted_at.is_none()) {
                map.entry(link.article_id).or_default().push(tag.into());
            }
        }

        for tags in map.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(map)
    }
}
