//! Tag handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContentAction, ContentEvent, ContentEventMessage, MessageResponse, Resource, TagListResponse,
    TAG_SLUG_MAX_LEN, TagRequest, TagResponse, make_slug,
};
use crate::services::EventBroadcaster;

/// Validated name and derived slug; rejects duplicates of another tag.
async fn tag_name_and_slug(
    pool: &DbPool,
    body: &TagRequest,
    exclude: Option<Uuid>,
) -> AppResult<(String, String)> {
    body.validate()?;

    let name = body.name.trim().to_string();
    let slug = make_slug(&name, TAG_SLUG_MAX_LEN);
    if slug.is_empty() {
        return Err(AppError::InvalidInput(
            "Tag name must contain at least one letter or digit".to_string(),
        ));
    }
    if pool.tag_name_taken(&name, &slug, exclude).await? {
        return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
    }

    Ok((name, slug))
}

/// All tags with published-article counts.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "Tags",
    responses(
        (status = 200, description = "Tags", body = TagListResponse),
    )
)]
pub async fn list_tags(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let tags = pool.list_tags_with_counts().await?;
    Ok(HttpResponse::Ok().json(TagListResponse { tags }))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/tags",
    tag = "Dashboard",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Tag already exists", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn create_tag(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let (name, slug) = tag_name_and_slug(pool.get_ref(), &body, None).await?;
    let tag = pool.insert_tag(&name, &slug).await?;

    info!(tag_id = %tag.id, slug = %tag.slug, user = %auth.caller.username, "Tag created");
    broadcaster.send(ContentEventMessage::new(ContentEvent::created(
        Resource::Tags,
        tag.id,
    )));

    Ok(HttpResponse::Created().json(TagResponse::from(tag)))
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/tags/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag renamed", body = TagResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Tag already exists", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_tag(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if pool.get_tag(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Tag {}", id)));
    }

    let (name, slug) = tag_name_and_slug(pool.get_ref(), &body, Some(id)).await?;
    let tag = pool.update_tag(id, &name, &slug).await?;

    info!(tag_id = %id, user = %auth.caller.username, "Tag updated");
    // Article cards embed tag names, so both caches go stale.
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(Resource::Tags, id)));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Articles,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(TagResponse::from(tag)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dashboard/tags/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag deleted and detached from articles", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_tag(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if !pool.delete_tag(id).await? {
        return Err(AppError::NotFound(format!("Tag {}", id)));
    }

    info!(tag_id = %id, user = %auth.caller.username, "Tag deleted");
    broadcaster.send(ContentEventMessage::new(ContentEvent::deleted(Resource::Tags, id)));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Articles,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Tag deleted".to_string(),
        id,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/tags").route(web::get().to(list_tags)))
        .service(web::resource("/dashboard/tags").route(web::post().to(create_tag)))
        .service(
            web::resource("/dashboard/tags/{id}")
                .route(web::put().to(update_tag))
                .route(web::delete().to(delete_tag)),
        );
}
