//! Actix-web extractor for dashboard authentication.
//!
//! Accepted credentials, in order:
//! - `X-Admin-Key` matching the configured bootstrap key (acts as admin)
//! - session JWT in the `ds_session` cookie
//! - session JWT as `Authorization: Bearer <token>`

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use secrecy::{ExposeSecret, SecretString};
use std::future::{Ready, ready};
use uuid::Uuid;

use super::{AdminKey, Caller};
use crate::config::{ADMIN_KEY_HEADER, Config};
use crate::error::AppError;
use crate::services::github_oauth::verify_session_token;

/// Access token cookie name (short-lived JWT).
pub const ACCESS_COOKIE: &str = "ds_session";

/// Extract a secret header value, wrapping it in SecretString.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Session token from the cookie, falling back to a bearer header.
fn extract_session_token(req: &HttpRequest) -> Option<SecretString> {
    if let Some(cookie) = req.cookie(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(SecretString::from(cookie.value().to_string()));
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| SecretString::from(t.trim().to_string()))
}

/// Extractor that requires an authenticated caller of any role.
///
/// Handlers check the role they need:
/// ```ignore
/// async fn handler(auth: SessionAuth) -> AppResult<HttpResponse> {
///     auth.caller.require_editor()?;
///     // ...
/// }
/// ```
pub struct SessionAuth {
    pub caller: Caller,
}

impl FromRequest for SessionAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(|caller| SessionAuth { caller }))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Caller, AppError> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Unauthorized("Internal configuration error".to_string()))?;

    if let Some(provided) = extract_secret_header(req, ADMIN_KEY_HEADER) {
        let stored = req.app_data::<web::Data<AdminKey>>();
        if stored.is_some_and(|key| key.verify(provided.expose_secret())) {
            return Ok(Caller::bootstrap_admin());
        }
        return Err(AppError::Unauthorized("Invalid admin key".to_string()));
    }

    let token = extract_session_token(req)
        .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

    let claims = verify_session_token(token.expose_secret(), &config.github_oauth.session_secret)
        .map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::Unauthorized("Session expired or invalid".to_string())
        })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Session expired or invalid".to_string()))?;

    Ok(Caller {
        user_id: Some(user_id),
        username: claims.username,
        role: claims.role,
    })
}
