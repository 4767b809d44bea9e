//! Landing-site routes backed by configuration.

use actix_web::test;
use serde_json::Value;

use super::common::{create_test_app, test_config};

#[actix_rt::test]
async fn test_contacts_come_from_config() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/site/contacts")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["email"], "office@dept.example.edu");
    assert_eq!(body["hours"], "Mon-Fri 9:00-17:00");
    assert!(body["phone"].is_null());
}

#[actix_rt::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/site/nowhere")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
