//! Authentication: dashboard sessions and the bootstrap admin key.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Role;

pub use extractor::{ACCESS_COOKIE, SessionAuth};

/// Wrapper type for the bootstrap admin key.
/// Uses `SecretString` to prevent accidental logging and zeroize on drop.
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    /// A blank key counts as unset.
    pub fn new(key: Option<String>) -> Self {
        Self(
            key.filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
        )
    }

    /// Constant-time comparison against the stored key. Always false when
    /// unset or when `provided` is empty.
    pub fn verify(&self, provided: &str) -> bool {
        if provided.is_empty() {
            return false;
        }
        match &self.0 {
            Some(secret) => {
                let expected = secret.expose_secret();
                expected.as_bytes().ct_eq(provided.as_bytes()).into()
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}

/// Who is making an authenticated request.
#[derive(Debug, Clone)]
pub struct Caller {
    /// `None` for the bootstrap admin key, which has no user row.
    pub user_id: Option<Uuid>,
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn bootstrap_admin() -> Self {
        Self {
            user_id: None,
            username: "admin (bootstrap)".to_string(),
            role: Role::Admin,
        }
    }

    /// Editors and admins may change site content.
    pub fn require_editor(&self) -> AppResult<()> {
        if self.role.can_manage_content() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Editor or admin role required".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }
}
