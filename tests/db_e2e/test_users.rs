//! Role management through the dashboard.

use actix_web::test;
use department_site::db::refresh_tokens::{generate_token, hash_token};
use department_site::error::AppError;
use department_site::models::Role;
use department_site::services::EventBroadcaster;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_admin_demotes_admin_and_revokes_sessions() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;

    let target = create_user(&pool, Role::Admin).await;
    let caller = create_user(&pool, Role::Admin).await;

    let hash = hash_token(&generate_token());
    pool.insert_refresh_token(target.id, &hash, 3600)
        .await
        .expect("insert token");

    let (status, body) = send_as(
        &app,
        &caller,
        test::TestRequest::put()
            .uri(&format!("/api/v1/dashboard/users/{}/role", target.id))
            .set_json(json!({ "role": "editor" })),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["role"], "editor");

    assert_eq!(pool.consume_refresh_token(&hash).await.unwrap(), None);

    let target_id = target.id.to_string();
    let events = drain_events(&mut rx);
    let parts: Vec<_> = events.iter().map(event_parts).collect();
    assert_eq!(parts, [("users", "updated", Some(target_id.as_str()))]);
}

#[actix_rt::test]
async fn test_own_role_change_is_rejected() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;
    let caller = create_user(&pool, Role::Admin).await;

    let (status, body) = send_as(
        &app,
        &caller,
        test::TestRequest::put()
            .uri(&format!("/api/v1/dashboard/users/{}/role", caller.id))
            .set_json(json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let stored = pool.find_user(caller.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[actix_rt::test]
async fn test_editor_cannot_list_users() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;
    let editor = create_user(&pool, Role::Editor).await;

    let (status, _) = send_as(
        &app,
        &editor,
        test::TestRequest::get().uri("/api/v1/dashboard/users"),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_rt::test]
async fn test_rejected_role_change_rolls_back() {
    let Some(pool) = test_pool().await else { return };
    let target = create_user(&pool, Role::Admin).await;

    let mut seen = None;
    let result = pool
        .change_user_role(target.id, Role::User, |before, admin_count| {
            seen = Some((before.role, admin_count));
            Err(AppError::InvalidInput("rejected".to_string()))
        })
        .await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    let (role, admin_count) = seen.expect("check runs");
    assert_eq!(role, Role::Admin);
    assert!(admin_count >= 1);

    let stored = pool.find_user(target.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[actix_rt::test]
async fn test_unknown_user_is_not_found() {
    let Some(pool) = test_pool().await else { return };
    let result = pool
        .change_user_role(uuid::Uuid::now_v7(), Role::Editor, |_, _| Ok(()))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
