//! Media handlers: image upload for the dashboard and public serving.

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use tracing::info;

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::media::{ALLOWED_IMAGE_EXTENSIONS, MEDIA_KEY_PREFIX, image_extension};
use crate::models::{
    ContentAction, ContentEvent, ContentEventMessage, MediaUploadResponse, Resource, media_url,
};
use crate::services::{EventBroadcaster, Storage};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Keys are never reused.
const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Uploaded SVGs may carry scripts; they must never run on this origin.
const MEDIA_CONTENT_SECURITY_POLICY: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

/// Validate the `{name}` segment of `/media/{name}`.
pub fn media_object_key(name: &str) -> AppResult<String> {
    if name.is_empty() || name.contains('/') || name.contains("..") {
        return Err(AppError::NotFound(format!("Media {}", name)));
    }
    if image_extension(name).is_none() {
        return Err(AppError::NotFound(format!("Media {}", name)));
    }
    Ok(format!("{}{}", MEDIA_KEY_PREFIX, name))
}

/// Upload an image (multipart field `file`).
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/media",
    tag = "Dashboard",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 201, description = "Image stored", body = MediaUploadResponse),
        (status = 400, description = "Missing file, unsupported type or too large", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn upload_media(
    auth: SessionAuth,
    mut payload: Multipart,
    config: web::Data<Config>,
    storage: web::Data<Storage>,
    broadcaster: web::Data<EventBroadcaster>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let max_size = config.max_upload_size;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;

        if content_disposition.get_name() != Some(FILE_FIELD) {
            // Drain unknown fields.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            }
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("File name is required".to_string()))?;

        let ext = image_extension(&filename).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported file type. Allowed: {}",
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            ))
        })?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > max_size {
                return Err(AppError::InvalidInput(format!(
                    "File exceeds the {} byte limit",
                    max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }

        let key = Storage::media_key(&ext);
        let content_type = Storage::content_type_for_extension(&ext);
        let size = data.len();

        storage.put(&key, data, Some(content_type)).await?;

        info!(
            key = %key,
            size,
            original = %filename,
            user = %auth.caller.username,
            "Media uploaded"
        );
        broadcaster.send(ContentEventMessage::new(ContentEvent::collection(
            Resource::Media,
            ContentAction::Created,
        )));

        return Ok(HttpResponse::Created().json(MediaUploadResponse {
            url: media_url(&key),
            key,
            size,
            content_type: content_type.to_string(),
        }));
    }

    Err(AppError::InvalidInput(format!(
        "Missing '{}' field",
        FILE_FIELD
    )))
}

/// Serve an uploaded image.
#[utoipa::path(
    get,
    path = "/api/v1/media/{name}",
    tag = "Media",
    params(("name" = String, Path, description = "Object name, e.g. `0190....png`")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_media(
    storage: web::Data<Storage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = media_object_key(&path.into_inner())?;
    let (data, stored_type) = storage.get(&key).await?;

    let content_type = stored_type.unwrap_or_else(|| {
        let ext = image_extension(&key).unwrap_or_default();
        Storage::content_type_for_extension(&ext).to_string()
    });

    Ok(media_response(data, content_type))
}

fn media_response(data: Vec<u8>, content_type: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, MEDIA_CACHE_CONTROL))
        .insert_header((header::CONTENT_SECURITY_POLICY, MEDIA_CONTENT_SECURITY_POLICY))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(data)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/media/{name}").route(web::get().to(get_media)))
        .service(web::resource("/dashboard/media").route(web::post().to(upload_media)));
}
