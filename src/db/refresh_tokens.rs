//! Database operations for refresh tokens.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entity::refresh_token::{self, Entity as RefreshToken};
use crate::error::AppResult;

use super::DbPool;

/// Hash a refresh token using SHA-256; only the hash is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random refresh token string.
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("ds_rt_{}", hex::encode(random_bytes))
}

impl DbPool {
    /// Insert a new refresh token (stores the hash, not the raw token).
    pub async fn insert_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(ttl_secs as i64);

        let model = refresh_token::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(expires_at),
            revoked_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        RefreshToken::insert(model).exec(self.connection()).await?;

        Ok(())
    }

    /// Revoke an active, unexpired token and return its owner, in one statement.
    ///
    /// Of two concurrent calls with the same token only one gets `Some`.
    pub async fn consume_refresh_token(&self, token_hash: &str) -> AppResult<Option<Uuid>> {
        let now = Utc::now();
        let revoked = RefreshToken::update_many()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .filter(refresh_token::Column::DeletedAt.is_null())
            .filter(refresh_token::Column::ExpiresAt.gt(now))
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(now)))
            .exec_with_returning(self.connection())
            .await?;

        match revoked.as_slice() {
            [token] => Ok(Some(token.user_id)),
            _ => Ok(None),
        }
    }

    /// Revoke a refresh token by its hash. Returns false if nothing was active.
    pub async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<bool> {
        let result = RefreshToken::update_many()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .filter(refresh_token::Column::DeletedAt.is_null())
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(Utc::now())))
            .exec(self.connection())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Revoke every active refresh token of a user (role changes force re-login).
    pub async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let result = RefreshToken::update_many()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .filter(refresh_token::Column::DeletedAt.is_null())
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(Utc::now())))
            .exec(self.connection())
            .await?;

        Ok(result.rows_affected)
    }

    /// Soft-delete tokens that expired or were revoked more than `older_than_secs` ago.
    pub async fn cleanup_refresh_tokens(&self, older_than_secs: u64) -> AppResult<u64> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::seconds(older_than_secs as i64);

        let result = RefreshToken::update_many()
            .filter(refresh_token::Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(refresh_token::Column::ExpiresAt.lt(cutoff))
                    .add(refresh_token::Column::RevokedAt.lt(cutoff)),
            )
            .col_expr(refresh_token::Column::DeletedAt, Expr::value(Some(now)))
            .exec(self.connection())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_prefixed() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.starts_with("ds_rt_"));
        assert_eq!(a.len(), "ds_rt_".len() + 64);
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("ds_rt_abc");
        assert_eq!(hash, hash_token("ds_rt_abc"));
        assert_ne!(hash, hash_token("ds_rt_abd"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
