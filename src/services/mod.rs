//! Business logic services.

pub mod cleanup;
pub mod event_broadcaster;
pub mod github_oauth;
pub mod storage;

pub use cleanup::{CleanupConfig, start_cleanup_task};
pub use event_broadcaster::EventBroadcaster;
pub use github_oauth::configure_routes as configure_auth_routes;
pub use storage::Storage;
