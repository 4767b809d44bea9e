//! Domain models and request/response DTOs for the department site.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub mod article;
pub mod content_event;
pub mod employee;
pub mod media;
pub mod site;
pub mod subject;
pub mod tag;
pub mod user;

// Re-export commonly used types
pub use article::{
    ArticleDetail, ArticleListResponse, ArticleRequest, ArticleStatus, ArticleSummary, AuthorInfo,
    ListArticlesQuery,
};
pub use content_event::{ContentAction, ContentChangedPayload, ContentEvent, ContentEventMessage, Resource};
pub use employee::{EmployeeListResponse, EmployeeRequest, EmployeeResponse};
pub use media::{MediaUploadResponse, media_url};
pub use site::{HomeResponse, SiteStats};
pub use subject::{SubjectListResponse, SubjectRequest, SubjectResponse, SubjectWithTeachers, TeacherRef};
pub use tag::{TagListResponse, TagRequest, TagResponse, TagWithCount};
pub use user::{
    ListUsersQuery, Role, SessionClaims, UpdateRoleRequest, User, UserListResponse, UserResponse,
};

/// Largest page a list endpoint will return.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Limit/offset pair shared by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema, IntoParams)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Build a page from raw query values, clamping `limit` to `1..=MAX_PAGE_SIZE`.
    pub fn new(limit: Option<u64>, offset: Option<u64>, default_limit: u64) -> Self {
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Width of `articles.slug`.
pub const ARTICLE_SLUG_MAX_LEN: usize = 220;
/// Width of `tags.slug`.
pub const TAG_SLUG_MAX_LEN: usize = 80;

/// Build a URL slug from free text (transliterated, lowercase, dash separated).
///
/// Transliteration can lengthen non-Latin text several times over, so the
/// result is cut to `max_len` characters without a trailing dash.
pub fn make_slug(input: &str, max_len: usize) -> String {
    let slug: String = slug::slugify(input.trim()).chars().take(max_len).collect();
    slug.trim_end_matches('-').to_string()
}

/// Trim an optional string, mapping blanks to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Simple `{ "message", "id" }` acknowledgement for deletes and toggles.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    pub id: uuid::Uuid,
}
