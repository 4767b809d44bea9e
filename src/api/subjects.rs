//! Subject (taught course) handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContentAction, ContentEvent, ContentEventMessage, MessageResponse, Resource,
    SubjectListResponse, SubjectRequest, SubjectResponse, non_blank,
};
use crate::services::EventBroadcaster;

async fn subject_fields(
    pool: &DbPool,
    body: SubjectRequest,
    exclude: Option<Uuid>,
) -> AppResult<(String, Option<String>)> {
    body.validate()?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "Subject name cannot be blank".to_string(),
        ));
    }
    if pool.subject_name_taken(&name, exclude).await? {
        return Err(AppError::Conflict(format!(
            "Subject '{}' already exists",
            name
        )));
    }

    Ok((name, non_blank(body.description)))
}

/// Subjects with the staff who teach them.
#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    tag = "Subjects",
    responses(
        (status = 200, description = "Subjects", body = SubjectListResponse),
    )
)]
pub async fn list_subjects(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let subjects = pool.list_subjects_with_teachers().await?;
    Ok(HttpResponse::Ok().json(SubjectListResponse { subjects }))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/subjects",
    tag = "Dashboard",
    request_body = SubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Subject already exists", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn create_subject(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    body: web::Json<SubjectRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let (name, description) = subject_fields(pool.get_ref(), body.into_inner(), None).await?;
    let subject = pool.insert_subject(&name, description).await?;

    info!(subject_id = %subject.id, user = %auth.caller.username, "Subject created");
    broadcaster.send(ContentEventMessage::new(ContentEvent::created(
        Resource::Subjects,
        subject.id,
    )));

    Ok(HttpResponse::Created().json(SubjectResponse::from(subject)))
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/subjects/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = SubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Subject already exists", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_subject(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<SubjectRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if pool.get_subject(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Subject {}", id)));
    }

    let (name, description) = subject_fields(pool.get_ref(), body.into_inner(), Some(id)).await?;
    let subject = pool.update_subject(id, &name, description).await?;

    info!(subject_id = %id, user = %auth.caller.username, "Subject updated");
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(
        Resource::Subjects,
        id,
    )));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Employees,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(SubjectResponse::from(subject)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dashboard/subjects/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_subject(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if !pool.delete_subject(id).await? {
        return Err(AppError::NotFound(format!("Subject {}", id)));
    }

    info!(subject_id = %id, user = %auth.caller.username, "Subject deleted");
    broadcaster.send(ContentEventMessage::new(ContentEvent::deleted(
        Resource::Subjects,
        id,
    )));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Employees,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Subject deleted".to_string(),
        id,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/subjects").route(web::get().to(list_subjects)))
        .service(web::resource("/dashboard/subjects").route(web::post().to(create_subject)))
        .service(
            web::resource("/dashboard/subjects/{id}")
                .route(web::put().to(update_subject))
                .route(web::delete().to(delete_subject)),
        );
}
