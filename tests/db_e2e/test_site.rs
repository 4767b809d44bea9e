//! Home page composition against real data.

use actix_web::test;
use department_site::services::EventBroadcaster;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_home_lists_unused_tags() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (status, tag) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": unique("Unused") })),
    )
    .await;
    assert_eq!(status, 201);
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let (status, home) = send(&app, test::TestRequest::get().uri("/api/v1/site/home")).await;
    assert_eq!(status, 200);

    let listed = home["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == tag_id.as_str())
        .expect("tag without articles is listed");
    assert_eq!(listed["article_count"], 0);
}

#[actix_rt::test]
async fn test_home_counts_published_articles() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, tag) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": unique("Used") })),
    )
    .await;
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let (_, article) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(json!({
                "title": unique("Home news"),
                "content": "Body text",
                "tag_ids": [tag_id],
            })),
    )
    .await;
    let article_id = article["id"].as_str().unwrap().to_string();

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/dashboard/articles/{article_id}/publish")),
    )
    .await;
    assert_eq!(status, 200);

    let (_, home) = send(&app, test::TestRequest::get().uri("/api/v1/site/home")).await;
    assert!(home["latest_articles"].as_array().unwrap().len() <= 3);
    assert!(home["stats"]["published_articles"].as_u64().unwrap() >= 1);

    let listed = home["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == tag_id.as_str())
        .expect("tag is listed");
    assert_eq!(listed["article_count"], 1);
}
