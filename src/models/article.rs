//! Article domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::TagResponse;

/// Publication state filter for the dashboard list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
}

/// Create/update body for articles. Updates replace every field, including tags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    #[serde(default)]
    #[validate(length(max = 220, message = "Slug must be at most 220 characters"))]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Summary must be at most 500 characters"))]
    pub summary: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    #[serde(default)]
    pub cover_image_key: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub is_published: bool,
}

/// Query parameters for article lists (public and dashboard).
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListArticlesQuery {
    /// Tag slug.
    #[serde(default)]
    pub tag: Option<String>,
    /// Case-insensitive match on title or summary.
    #[serde(default)]
    pub search: Option<String>,
    /// Dashboard only; ignored on the public list.
    #[serde(default)]
    pub status: Option<ArticleStatus>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Public author card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<crate::entity::user::Model> for AuthorInfo {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            display_name: m.display_name,
            avatar_url: m.avatar_url,
        }
    }
}

/// Article card for lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub cover_image_key: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<TagResponse>,
    pub author: Option<AuthorInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleSummary {
    pub fn from_parts(
        m: &crate::entity::article::Model,
        tags: Vec<TagResponse>,
        author: Option<AuthorInfo>,
    ) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            slug: m.slug.clone(),
            summary: m.summary.clone(),
            cover_image_key: m.cover_image_key.clone(),
            cover_image_url: m.cover_image_key.as_deref().map(super::media_url),
            is_published: m.is_published,
            published_at: m.published_at,
            tags,
            author,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Full article, summary fields plus the body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleSummary>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
