//! Tag DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Create/update body for tags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 64, message = "Tag name must be between 1 and 64 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<crate::entity::tag::Model> for TagResponse {
    fn from(m: crate::entity::tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

/// Tag with the number of published articles carrying it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: TagResponse,
    pub article_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TagListResponse {
    pub tags: Vec<TagWithCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_request_validation() {
        assert!(TagRequest { name: "News".into() }.validate().is_ok());
        assert!(TagRequest { name: String::new() }.validate().is_err());
        assert!(TagRequest { name: "x".repeat(65) }.validate().is_err());
    }

    #[test]
    fn test_tag_with_count_flattens() {
        let value = serde_json::to_value(TagWithCount {
            tag: TagResponse {
                id: Uuid::nil(),
                name: "Events".into(),
                slug: "events".into(),
            },
            article_count: 3,
        })
        .unwrap();

        assert_eq!(value["slug"], "events");
        assert_eq!(value["article_count"], 3);
    }
}
