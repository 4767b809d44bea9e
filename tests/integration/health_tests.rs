//! Liveness and build info.

use actix_web::test;
use serde_json::Value;

use super::common::{create_test_app, test_config};

#[actix_rt::test]
async fn test_health_is_public() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[actix_rt::test]
async fn test_info_reports_oauth_availability() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get().uri("/api/v1/info").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["environment"], "development");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["github_oauth_enabled"], false);
}
