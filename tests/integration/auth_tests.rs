//! Dashboard routes reject callers before any database work.

use actix_web::http::header;
use actix_web::test;
use serde_json::Value;

use super::common::{create_test_app, test_config};

#[actix_rt::test]
async fn test_dashboard_requires_sign_in() {
    let app = create_test_app(test_config()).await;

    for uri in ["/api/v1/dashboard/articles", "/api/v1/dashboard/users"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{uri} should require a session");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}

#[actix_rt::test]
async fn test_mutations_require_sign_in() {
    let app = create_test_app(test_config()).await;
    let requests = [
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(serde_json::json!({ "name": "Events" })),
        test::TestRequest::post()
            .uri("/api/v1/dashboard/employees")
            .set_json(serde_json::json!({ "full_name": "Ada Lovelace" })),
        test::TestRequest::delete()
            .uri("/api/v1/dashboard/subjects/0192f0c4-5a3e-7000-8000-000000000001"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 401);
    }
}

#[actix_rt::test]
async fn test_wrong_admin_key_is_rejected() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/articles")
        .insert_header(("X-Admin-Key", "not-the-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_admin_key_rejected_when_not_configured() {
    let mut config = test_config();
    config.admin_key = None;
    let app = create_test_app(config).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/articles")
        .insert_header(("X-Admin-Key", ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_garbage_bearer_token_is_rejected() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/articles")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_github_login_unavailable_without_oauth_app() {
    let app = create_test_app(test_config()).await;
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/github")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
