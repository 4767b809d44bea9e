//! `/ws` is limited to editors and admins.

use actix_web::http::header;
use actix_web::test;
use department_site::models::Role;

use super::common::{create_test_app, session_token, test_config};

#[actix_rt::test]
async fn test_websocket_requires_sign_in() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get().uri("/api/v1/ws").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_websocket_rejects_plain_users() {
    let app = create_test_app(test_config()).await;
    let token = session_token(Role::User);
    let req = test::TestRequest::get()
        .uri("/api/v1/ws")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
async fn test_websocket_accepts_editor_session_cookie() {
    let app = create_test_app(test_config()).await;
    let token = session_token(Role::Editor);
    // Authenticated, but not a WebSocket handshake.
    let req = test::TestRequest::get()
        .uri("/api/v1/ws")
        .cookie(actix_web::cookie::Cookie::new("ds_session", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_blank_admin_key_does_not_authenticate() {
    let mut config = test_config();
    config.admin_key = Some(String::new());
    let app = create_test_app(config).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/ws")
        .insert_header(("X-Admin-Key", ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
