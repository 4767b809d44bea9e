//! Media (uploaded image) DTOs and key helpers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix of every uploaded object key.
pub const MEDIA_KEY_PREFIX: &str = "media/";

/// Image extensions accepted by the media upload endpoint.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Public URL under which a stored object is served.
pub fn media_url(key: &str) -> String {
    format!("/api/v1/{}", key.trim_start_matches('/'))
}

/// Lowercased extension of `filename` if it is an accepted image type.
pub fn image_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaUploadResponse {
    /// Object key to store on an article (`cover_image_key`) or employee (`photo_key`).
    pub key: String,
    pub url: String,
    pub size: usize,
    pub content_type: String,
}
