//! Background cleanup of stale refresh tokens.

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::config::Environment;
use crate::db::DbPool;
use crate::error::AppResult;

/// Tokens expired or revoked longer ago than this are soft-deleted.
const REFRESH_TOKEN_GRACE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_secs: u64,
    pub grace_secs: u64,
}

impl CleanupConfig {
    /// Every minute in development, hourly otherwise.
    pub fn for_environment(environment: Environment) -> Self {
        let interval_secs = if environment.is_development() { 60 } else { 3600 };
        Self {
            interval_secs,
            grace_secs: REFRESH_TOKEN_GRACE_SECS,
        }
    }
}

/// Spawn the periodic cleanup task.
pub fn start_cleanup_task(pool: DbPool, config: CleanupConfig) {
    tokio::spawn(async move {
        info!(
            "Starting cleanup service (interval: {} seconds)",
            config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs));

        loop {
            ticker.tick().await;

            if let Err(e) = run_cleanup(&pool, &config).await {
                error!("Cleanup task error: {}", e);
            }
        }
    });
}

async fn run_cleanup(pool: &DbPool, config: &CleanupConfig) -> AppResult<()> {
    let removed = pool.cleanup_refresh_tokens(config.grace_secs).await?;
    if removed > 0 {
        info!("Refresh token cleanup: {} removed", removed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_per_environment() {
        assert_eq!(
            CleanupConfig::for_environment(Environment::Development).interval_secs,
            60
        );
        let prod = CleanupConfig::for_environment(Environment::Production);
        assert_eq!(prod.interval_secs, 3600);
        assert_eq!(prod.grace_secs, 86_400);
    }
}
