//! Department site server library.
//!
//! Public content API for the department website (news, staff, subjects)
//! and the authenticated dashboard used by editors to manage it.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

use actix_web::web;

/// Mount every `/api/v1` route. Shared state is registered by the caller.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(api::configure_health_routes)
            .configure(services::configure_auth_routes)
            .configure(api::configure_content_routes)
            .configure(api::configure_websocket_routes),
    );
}
