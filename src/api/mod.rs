//! API endpoint modules.

pub mod articles;
pub mod employees;
pub mod health;
pub mod media;
pub mod openapi;
pub mod site;
pub mod subjects;
pub mod tags;
pub mod users;
pub mod websocket;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use websocket::configure_routes as configure_websocket_routes;

/// Register every content route (public and dashboard) under the caller's scope.
pub fn configure_content_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(articles::configure_routes)
        .configure(tags::configure_routes)
        .configure(subjects::configure_routes)
        .configure(employees::configure_routes)
        .configure(site::configure_routes)
        .configure(media::configure_routes)
        .configure(users::configure_routes);
}
