//! Employee (staff directory) handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::db::employees::EmployeeFields;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContentAction, ContentEvent, ContentEventMessage, EmployeeListResponse, EmployeeRequest,
    EmployeeResponse, MessageResponse, Resource, non_blank,
};
use crate::services::EventBroadcaster;

/// Normalize blanks to `None`, validate, and check that all subjects exist.
async fn employee_fields(pool: &DbPool, body: EmployeeRequest) -> AppResult<EmployeeFields> {
    let body = EmployeeRequest {
        full_name: body.full_name.trim().to_string(),
        position: body.position.trim().to_string(),
        academic_degree: non_blank(body.academic_degree),
        academic_title: non_blank(body.academic_title),
        email: non_blank(body.email),
        phone: non_blank(body.phone),
        bio: non_blank(body.bio),
        photo_key: non_blank(body.photo_key),
        ..body
    };
    body.validate()?;

    let subject_ids = crate::db::dedup_ids(&body.subject_ids);
    if pool.count_active_subjects(&subject_ids).await? != subject_ids.len() as u64 {
        return Err(AppError::InvalidInput(
            "One or more subjects do not exist".to_string(),
        ));
    }

    Ok(EmployeeFields {
        full_name: body.full_name,
        position: body.position,
        academic_degree: body.academic_degree,
        academic_title: body.academic_title,
        email: body.email,
        phone: body.phone,
        bio: body.bio,
        photo_key: body.photo_key,
        sort_order: body.sort_order,
        subject_ids,
    })
}

async fn employee_response(
    pool: &DbPool,
    employee: crate::entity::employee::Model,
) -> AppResult<EmployeeResponse> {
    let id = employee.id;
    pool.employee_responses(vec![employee])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))
}

/// Staff directory in display order.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Employees", body = EmployeeListResponse),
    )
)]
pub async fn list_employees(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let employees = pool.list_employees().await?;
    let employees = pool.employee_responses(employees).await?;
    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees }))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = EmployeeResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_employee(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let employee = pool
        .get_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))?;

    Ok(HttpResponse::Ok().json(employee_response(pool.get_ref(), employee).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/employees",
    tag = "Dashboard",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn create_employee(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    body: web::Json<EmployeeRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let fields = employee_fields(pool.get_ref(), body.into_inner()).await?;
    let employee = pool.insert_employee(fields).await?;

    info!(employee_id = %employee.id, user = %auth.caller.username, "Employee created");
    broadcaster.send(ContentEventMessage::new(ContentEvent::created(
        Resource::Employees,
        employee.id,
    )));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Subjects,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Created().json(employee_response(pool.get_ref(), employee).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/employees/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = EmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_employee(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<EmployeeRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if pool.get_employee(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Employee {}", id)));
    }

    let fields = employee_fields(pool.get_ref(), body.into_inner()).await?;
    let employee = pool.update_employee(id, fields).await?;

    info!(employee_id = %id, user = %auth.caller.username, "Employee updated");
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(
        Resource::Employees,
        id,
    )));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Subjects,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(employee_response(pool.get_ref(), employee).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dashboard/employees/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_employee(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if !pool.delete_employee(id).await? {
        return Err(AppError::NotFound(format!("Employee {}", id)));
    }

    info!(employee_id = %id, user = %auth.caller.username, "Employee deleted");
    broadcaster.send(ContentEventMessage::new(ContentEvent::deleted(
        Resource::Employees,
        id,
    )));
    broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
        Resource::Subjects,
        ContentAction::Updated,
    )));

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Employee deleted".to_string(),
        id,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/employees").route(web::get().to(list_employees)))
        .service(web::resource("/employees/{id}").route(web::get().to(get_employee)))
        .service(web::resource("/dashboard/employees").route(web::post().to(create_employee)))
        .service(
            web::resource("/dashboard/employees/{id}")
                .route(web::put().to(update_employee))
                .route(web::delete().to(delete_employee)),
        );
}
