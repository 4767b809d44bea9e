//! Employee (staff) DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::SubjectResponse;

/// Create/update body for employees. `subject_ids` replaces the taught subjects.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EmployeeRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be between 1 and 200 characters"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 200, message = "Position must be between 1 and 200 characters"))]
    pub position: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Academic degree must be at most 200 characters"))]
    pub academic_degree: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Academic title must be at most 200 characters"))]
    pub academic_title: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Bio must be at most 5000 characters"))]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_key: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub subject_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub full_name: String,
    pub position: String,
    pub academic_degree: Option<String>,
    pub academic_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo_key: Option<String>,
    pub photo_url: Option<String>,
    pub sort_order: i32,
    pub subjects: Vec<SubjectResponse>,
}

impl EmployeeResponse {
    pub fn from_parts(m: crate::entity::employee::Model, subjects: Vec<SubjectResponse>) -> Self {
        let photo_url = m.photo_key.as_deref().map(super::media_url);
        Self {
            id: m.id,
            full_name: m.full_name,
            position: m.position,
            academic_degree: m.academic_degree,
            academic_title: m.academic_title,
            email: m.email,
            phone: m.phone,
            bio: m.bio,
            photo_key: m.photo_key,
            photo_url,
            sort_order: m.sort_order,
            subjects,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<EmployeeResponse>,
}
