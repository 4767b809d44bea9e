//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, config, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Department Site API",
        description = "Public content for the department website and the editor dashboard behind it"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        api::health::info,
        // Public content
        api::articles::list_published_articles,
        api::articles::get_published_article,
        api::tags::list_tags,
        api::subjects::list_subjects,
        api::employees::list_employees,
        api::employees::get_employee,
        api::site::home,
        api::site::contacts,
        api::media::get_media,
        // Dashboard
        api::articles::list_articles,
        api::articles::get_article,
        api::articles::create_article,
        api::articles::update_article,
        api::articles::publish_article,
        api::articles::unpublish_article,
        api::articles::delete_article,
        api::tags::create_tag,
        api::tags::update_tag,
        api::tags::delete_tag,
        api::subjects::create_subject,
        api::subjects::update_subject,
        api::subjects::delete_subject,
        api::employees::create_employee,
        api::employees::update_employee,
        api::employees::delete_employee,
        api::media::upload_media,
        api::users::list_users,
        api::users::update_user_role,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::health::InfoResponse,
            // Content
            models::ArticleStatus,
            models::ArticleRequest,
            models::ArticleSummary,
            models::ArticleDetail,
            models::ArticleListResponse,
            models::AuthorInfo,
            models::TagRequest,
            models::TagResponse,
            models::TagWithCount,
            models::TagListResponse,
            models::SubjectRequest,
            models::SubjectResponse,
            models::SubjectWithTeachers,
            models::SubjectListResponse,
            models::TeacherRef,
            models::EmployeeRequest,
            models::EmployeeResponse,
            models::EmployeeListResponse,
            models::MediaUploadResponse,
            models::HomeResponse,
            models::SiteStats,
            config::ContactSettings,
            // Users
            models::Role,
            models::UserResponse,
            models::UserListResponse,
            models::UpdateRoleRequest,
            services::github_oauth::MeResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Articles", description = "Published news and announcements"),
        (name = "Tags", description = "Article tags"),
        (name = "Subjects", description = "Courses taught by the department"),
        (name = "Employees", description = "Staff directory"),
        (name = "Site", description = "Home page and contacts"),
        (name = "Media", description = "Uploaded images"),
        (name = "Dashboard", description = "Content and user management (editor or admin)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Register the session cookie and bootstrap admin key schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::ACCESS_COOKIE,
                ))),
            );
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::config::ADMIN_KEY_HEADER,
                ))),
            );
        }
    }
}
