//! GitHub OAuth routes for dashboard sign-in.
//!
//! Implements a short-lived access token + refresh token pattern:
//! - Access token: HS256 JWT in `ds_session` HttpOnly cookie (default 15 min)
//! - Refresh token: opaque token (SHA-256 hashed in DB) in `ds_refresh` HttpOnly cookie (default 7 days)
//!
//! Endpoints:
//! 1. GET /auth/github — Redirect to GitHub (with CSRF `state`)
//! 2. GET /auth/github/callback — Verify state, exchange code, issue token pair
//! 3. POST /auth/refresh — Rotate: validate refresh token, issue new pair, revoke old
//! 4. GET /auth/me — Return current user from access token
//! 5. POST /auth/logout — Revoke refresh token in DB, clear both cookies

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, get, post, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::auth::ACCESS_COOKIE;
use crate::config::{Config, GitHubOAuthSettings};
use crate::db::DbPool;
use crate::db::refresh_tokens::{generate_token, hash_token};
use crate::db::users::GitHubProfile;
use crate::error::{AppError, AppResult};
use crate::models::user::{GitHubUserInfo, SessionClaims, User, UserResponse};

/// Refresh token cookie name (long-lived opaque token).
const REFRESH_COOKIE: &str = "ds_refresh";
/// OAuth CSRF state cookie, verified on callback.
const OAUTH_STATE_COOKIE: &str = "ds_oauth_state";
/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "department-site";
const USER_AGENT: &str = "department-site";
const DEFAULT_CALLBACK_PATH: &str = "/api/v1/auth/github/callback";
/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(github_login)
        .service(github_callback)
        .service(refresh)
        .service(get_current_user)
        .service(logout);
}

fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            warn!("OAuth: failed to build HTTP client: {}", e);
            AppError::Unauthorized("GitHub authentication failed".to_string())
        })
}

fn generate_random_hex() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// HttpOnly cookie scoped to the whole site.
fn auth_cookie(name: &'static str, value: String, same_site: SameSite, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(same_site);
    cookie.set_secure(secure);
    cookie
}

fn ensure_enabled(oauth: &GitHubOAuthSettings) -> AppResult<()> {
    if oauth.enabled {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "GitHub OAuth is not configured".to_string(),
        ))
    }
}

fn github_failure<E: std::fmt::Display>(step: &'static str) -> impl FnOnce(E) -> AppError {
    move |e| {
        warn!("OAuth: {}: {}", step, e);
        AppError::Unauthorized("GitHub authentication failed".to_string())
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Redirect to GitHub OAuth authorization page.
///
/// GET /api/v1/auth/github
#[get("/auth/github")]
pub async fn github_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let oauth = &config.github_oauth;
    ensure_enabled(oauth)?;

    let client_id = oauth.client_id.as_ref().ok_or_else(|| {
        AppError::InvalidInput("GitHub OAuth client ID not configured".to_string())
    })?;

    let redirect_uri = oauth
        .redirect_url
        .as_deref()
        .unwrap_or(DEFAULT_CALLBACK_PATH);

    let state = generate_random_hex();

    let authorize_url = format!(
        "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&state={}&scope={}",
        client_id,
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&state),
        urlencoding::encode("read:user user:email"),
    );

    let state_cookie = auth_cookie(
        OAUTH_STATE_COOKIE,
        state,
        SameSite::Lax,
        config.environment.is_production(),
    );

    Ok(HttpResponse::Found()
        .cookie(state_cookie)
        .append_header(("Location", authorize_url))
        .finish())
}

/// Handle GitHub OAuth callback.
///
/// GET /api/v1/auth/github/callback?code=...&state=...
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let oauth = &config.github_oauth;
    ensure_enabled(oauth)?;

    // --- CSRF state verification ---
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    if !state_matches(&expected_state, query.state.as_deref()) {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    let client_id = oauth.client_id.as_ref().ok_or_else(|| {
        AppError::InvalidInput("GitHub OAuth client ID not configured".to_string())
    })?;
    let client_secret = oauth.client_secret.as_ref().ok_or_else(|| {
        AppError::InvalidInput("GitHub OAuth client secret not configured".to_string())
    })?;

    // --- Exchange code for access token ---
    let http_client = build_http_client()?;
    let token_response: TokenResponse = http_client
        .post("https://github.com/login/oauth/access_token")
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "client_id": client_id,
            "client_secret": client_secret.expose_secret(),
            "code": query.code,
        }))
        .send()
        .await
        .map_err(github_failure("failed to exchange code"))?
        .json()
        .await
        .map_err(github_failure("failed to parse token response"))?;

    if let Some(ref err) = token_response.error {
        warn!("OAuth: GitHub returned error: {}", err);
        return Err(AppError::Unauthorized(
            "GitHub authentication failed".to_string(),
        ));
    }

    let gh_access_token: SecretString = token_response
        .access_token
        .map(SecretString::from)
        .ok_or_else(|| {
            warn!("OAuth: no access_token in response");
            AppError::Unauthorized("GitHub authentication failed".to_string())
        })?;

    // --- Fetch user info ---
    let user_info: GitHubUserInfo = http_client
        .get("https://api.github.com/user")
        .header(
            "Authorization",
            format!("Bearer {}", gh_access_token.expose_secret()),
        )
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(github_failure("failed to fetch user info"))?
        .json()
        .await
        .map_err(github_failure("failed to parse user info"))?;

    // --- Upsert user in DB ---
    let user = pool
        .upsert_user_from_github(GitHubProfile {
            github_id: user_info.id,
            username: &user_info.login,
            display_name: user_info.name.as_deref(),
            avatar_url: user_info.avatar_url.as_deref(),
            email: user_info.email.as_deref(),
        })
        .await?;

    info!(
        "GitHub OAuth login: user='{}' (id={}, role={})",
        user.username, user.id, user.role
    );

    // --- Issue token pair and send the browser back to the site ---
    let is_prod = config.environment.is_production();
    let mut response =
        issue_token_pair(HttpResponse::Found(), &user, oauth, pool.get_ref(), is_prod).await?;

    let clear_state = auth_cookie(OAUTH_STATE_COOKIE, String::new(), SameSite::Lax, is_prod);

    Ok(response
        .cookie(clear_state)
        .append_header(("Location", config.public_url.clone()))
        .finish())
}

/// Refresh the access token using the refresh token.
///
/// Rotates: old refresh token is revoked, new pair is issued.
///
/// POST /api/v1/auth/refresh
#[post("/auth/refresh")]
pub async fn refresh(
    req: HttpRequest,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let oauth = &config.github_oauth;
    if !oauth.enabled {
        return Err(AppError::Unauthorized(
            "GitHub OAuth is not configured".to_string(),
        ));
    }

    let refresh_token = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No refresh token".to_string()))?;

    let user_id = pool
        .consume_refresh_token(&hash_token(&refresh_token))
        .await?
        .ok_or_else(|| {
            warn!("Refresh: invalid, expired or already used refresh token");
            AppError::Unauthorized("Invalid refresh token".to_string())
        })?;

    let user = pool.find_user(user_id).await?.ok_or_else(|| {
        warn!("Refresh: user {} not found", user_id);
        AppError::Unauthorized("User not found".to_string())
    })?;

    let is_prod = config.environment.is_production();
    let mut response =
        issue_token_pair(HttpResponse::Ok(), &user, oauth, pool.get_ref(), is_prod).await?;

    Ok(response.json(MeResponse {
        user: Some(user.into()),
    }))
}

/// Get the signed-in user, or `{"user": null}`.
///
/// The role comes from the database so recent role changes show up here
/// before the access token expires.
///
/// GET /api/v1/auth/me
#[get("/auth/me")]
pub async fn get_current_user(
    req: HttpRequest,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let anonymous = || HttpResponse::Ok().json(MeResponse { user: None });

    let token = match req.cookie(ACCESS_COOKIE) {
        Some(c) if !c.value().is_empty() => c.value().to_string(),
        _ => return Ok(anonymous()),
    };

    let claims = match verify_session_token(&token, &config.github_oauth.session_secret) {
        Ok(c) => c,
        Err(_) => return Ok(anonymous()),
    };

    let Ok(user_id) = uuid::Uuid::parse_str(&claims.sub) else {
        return Ok(anonymous());
    };

    match pool.find_user(user_id).await? {
        Some(u) => Ok(HttpResponse::Ok().json(MeResponse {
            user: Some(u.into()),
        })),
        None => Ok(anonymous()),
    }
}

/// Logout: revoke refresh token server-side, clear both cookies.
///
/// POST /api/v1/auth/logout
#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let is_prod = config.environment.is_production();

    if let Some(refresh_cookie) = req.cookie(REFRESH_COOKIE) {
        let token_hash = hash_token(refresh_cookie.value());
        if let Err(e) = pool.revoke_refresh_token(&token_hash).await {
            warn!("Logout: failed to revoke refresh token: {}", e);
        }
    }

    let clear_access = auth_cookie(ACCESS_COOKIE, String::new(), SameSite::Lax, is_prod);
    let clear_refresh = auth_cookie(REFRESH_COOKIE, String::new(), SameSite::Strict, is_prod);

    Ok(HttpResponse::Ok()
        .cookie(clear_access)
        .cookie(clear_refresh)
        .json(serde_json::json!({ "message": "Logged out" })))
}

// ============================================================================
// Helpers
// ============================================================================

fn state_matches(expected: &str, provided: Option<&str>) -> bool {
    match provided {
        Some(p) => !p.is_empty() && p == expected,
        None => false,
    }
}

/// Attach a fresh access token + refresh token pair as cookies.
async fn issue_token_pair(
    mut response: HttpResponseBuilder,
    user: &User,
    oauth: &GitHubOAuthSettings,
    pool: &DbPool,
    is_production: bool,
) -> AppResult<HttpResponseBuilder> {
    let access_token = create_access_token(user, &oauth.session_secret, oauth.access_token_ttl_secs)?;

    let raw_refresh_token = generate_token();
    pool.insert_refresh_token(
        user.id,
        &hash_token(&raw_refresh_token),
        oauth.refresh_token_ttl_secs,
    )
    .await?;

    response.cookie(auth_cookie(
        ACCESS_COOKIE,
        access_token,
        SameSite::Lax,
        is_production,
    ));
    response.cookie(auth_cookie(
        REFRESH_COOKIE,
        raw_refresh_token,
        SameSite::Strict,
        is_production,
    ));

    Ok(response)
}

/// Sign a session JWT for `user`.
pub fn create_access_token(user: &User, secret: &SecretString, ttl_secs: u64) -> AppResult<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::seconds(ttl_secs as i64);

    let claims = SessionClaims {
        sub: user.id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        username: user.username.clone(),
        role: user.role,
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
}

/// Verify an access token JWT and return claims.
pub fn verify_session_token(token: &str, secret: &SecretString) -> Result<SessionClaims, String> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| format!("Invalid session token: {}", e))?;

    Ok(token_data.claims)
}

// ============================================================================
// Types
// ============================================================================

#[derive(serde::Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub user: Option<UserResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::now_v7(),
            github_id: 42,
            username: "octocat".to_string(),
            display_name: None,
            avatar_url: None,
            email: None,
            role,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let secret = SecretString::from("unit-secret".to_string());
        let u = user(Role::Editor);
        let token = create_access_token(&u, &secret, 60).unwrap();

        let claims = verify_session_token(&token, &secret).unwrap();
        assert_eq!(claims.sub, u.id.to_string());
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert_eq!(claims.username, "octocat");
        assert_eq!(claims.role, Role::Editor);
    }

    #[test]
    fn test_access_token_rejects_wrong_secret() {
        let token = create_access_token(
            &user(Role::Admin),
            &SecretString::from("one".to_string()),
            60,
        )
        .unwrap();
        assert!(verify_session_token(&token, &SecretString::from("two".to_string())).is_err());
    }

    #[test]
    fn test_state_matches() {
        assert!(state_matches("abc", Some("abc")));
        assert!(!state_matches("abc", Some("abd")));
        assert!(!state_matches("", Some("")));
        assert!(!state_matches("abc", None));
    }
}
