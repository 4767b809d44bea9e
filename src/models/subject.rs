//! Subject DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubjectRequest {
    #[validate(length(min = 1, max = 200, message = "Subject name must be between 1 and 200 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<crate::entity::subject::Model> for SubjectResponse {
    fn from(m: crate::entity::subject::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

/// Minimal employee reference shown under a subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherRef {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubjectWithTeachers {
    #[serde(flatten)]
    pub subject: SubjectResponse,
    pub teachers: Vec<TeacherRef>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectListResponse {
    pub subjects: Vec<SubjectWithTeachers>,
}
