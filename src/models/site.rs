//! Landing-site composition DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ArticleSummary, TagWithCount};

/// Number of newest articles shown on the home page.
pub const HOME_LATEST_ARTICLES: u64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SiteStats {
    pub employees: u64,
    pub subjects: u64,
    pub published_articles: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HomeResponse {
    pub latest_articles: Vec<ArticleSummary>,
    pub tags: Vec<TagWithCount>,
    pub stats: SiteStats,
}
