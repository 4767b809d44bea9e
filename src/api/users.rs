//! Dashboard user management (admin only).

use actix_web::{HttpResponse, web};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContentEvent, ContentEventMessage, ListUsersQuery, Resource, Role, UpdateRoleRequest, User,
    UserListResponse, UserResponse,
};
use crate::services::EventBroadcaster;

/// Reject role changes that would lock the dashboard out.
///
/// `admin_count` is the number of admins before the change.
pub fn check_role_change(
    caller_id: Option<Uuid>,
    target: &User,
    new_role: Role,
    admin_count: u64,
) -> AppResult<()> {
    if caller_id == Some(target.id) {
        return Err(AppError::InvalidInput(
            "You cannot change your own role".to_string(),
        ));
    }
    if target.role == Role::Admin && new_role != Role::Admin && admin_count <= 1 {
        return Err(AppError::InvalidInput(
            "Cannot demote the last admin".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/users",
    tag = "Dashboard",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn list_users(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListUsersQuery>,
) -> AppResult<HttpResponse> {
    auth.caller.require_admin()?;

    let (users, total, page) = pool.list_users(&query).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/users/{id}/role",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Own role or last admin", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_user_role(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRoleRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_admin()?;
    let id = path.into_inner();
    let new_role = body.role;

    let target = pool
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

    if target.role == new_role {
        return Ok(HttpResponse::Ok().json(UserResponse::from(target)));
    }

    let caller_id = auth.caller.user_id;
    let (before, updated) = pool
        .change_user_role(id, new_role, |target, admin_count| {
            check_role_change(caller_id, target, new_role, admin_count)
        })
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::InvalidInput(_)) {
                warn!(
                    user_id = %id,
                    by = %auth.caller.username,
                    "Role change rejected: {}", e
                );
            }
        })?;

    // Force a fresh sign-in so the new role lands in the session token.
    let revoked = pool.revoke_user_refresh_tokens(id).await?;

    info!(
        user_id = %id,
        from = %before.role,
        to = %new_role,
        by = %auth.caller.username,
        revoked_sessions = revoked,
        "User role changed"
    );
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(
        Resource::Users,
        id,
    )));

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/dashboard/users").route(web::get().to(list_users)))
        .service(
            web::resource("/dashboard/users/{id}/role").route(web::put().to(update_user_role)),
        );
}
