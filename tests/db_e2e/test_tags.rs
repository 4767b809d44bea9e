//! Tag management and its effect on articles.

use actix_web::test;
use department_site::services::EventBroadcaster;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_duplicate_tag_name_is_conflict() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let name = unique("Seminars");
    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": name.to_uppercase() })),
    )
    .await;
    assert_eq!(status, 409, "{body}");
}

#[actix_rt::test]
async fn test_long_cyrillic_tag_name_fits_slug_column() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let name: String = format!("{} Щщщ ", unique("t")).chars().cycle().take(64).collect();
    let (status, body) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": name })),
    )
    .await;

    assert_eq!(status, 201, "{body}");
    assert!(body["slug"].as_str().unwrap().len() <= 80);
}

#[actix_rt::test]
async fn test_deleting_tag_detaches_it_from_articles() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, tag) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": unique("Temporary") })),
    )
    .await;
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let (status, created) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(json!({
                "title": unique("Tagged"),
                "content": "Body",
                "tag_ids": [tag_id],
            })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(created["tags"].as_array().unwrap().len(), 1);
    drain_events(&mut rx);

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::delete().uri(&format!("/api/v1/dashboard/tags/{tag_id}")),
    )
    .await;
    assert_eq!(status, 200);

    let (_, article) = send_as_admin(
        &app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/dashboard/articles/{}",
            created["id"].as_str().unwrap()
        )),
    )
    .await;
    assert!(article["tags"].as_array().unwrap().is_empty());

    let (_, tags) = send(&app, test::TestRequest::get().uri("/api/v1/tags")).await;
    assert!(
        tags["tags"]
            .as_array()
            .unwrap()
            .iter()
            .all(|t| t["id"] != tag_id.as_str())
    );

    let events = drain_events(&mut rx);
    let parts: Vec<_> = events.iter().map(event_parts).collect();
    assert_eq!(
        parts,
        [
            ("tags", "deleted", Some(tag_id.as_str())),
            ("articles", "updated", None),
        ]
    );
}

#[actix_rt::test]
async fn test_tag_referencing_unknown_id_is_rejected() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(json!({
                "title": unique("Orphan"),
                "content": "Body",
                "tag_ids": [uuid::Uuid::now_v7()],
            })),
    )
    .await;
    assert_eq!(status, 400);
}
