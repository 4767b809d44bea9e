//! Article lifecycle through the HTTP API.

use actix_web::test;
use department_site::models::Role;
use department_site::services::EventBroadcaster;
use serde_json::json;

use super::test_helpers::*;

fn article(title: &str) -> serde_json::Value {
    json!({ "title": title, "content": "Body text", "summary": "Short summary" })
}

#[actix_rt::test]
async fn test_create_derives_slug_and_broadcasts() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;
    let editor = create_user(&pool, Role::Editor).await;

    let title = unique("Open Day");
    let (status, body) = send_as(
        &app,
        &editor,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(article(&title)),
    )
    .await;

    assert_eq!(status, 201, "{body}");
    assert_eq!(body["slug"], title.to_lowercase().replace(' ', "-"));
    assert_eq!(body["is_published"], false);
    assert_eq!(body["author"]["username"], editor.username.as_str());

    let events = drain_events(&mut rx);
    assert_eq!(events.len(), 1);
    let (resource, action, id) = event_parts(&events[0]);
    assert_eq!((resource, action), ("articles", "created"));
    assert_eq!(id, body["id"].as_str());
}

#[actix_rt::test]
async fn test_duplicate_slug_is_conflict_on_create_and_update() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let slug = unique("taken");
    let mut first = article("First");
    first["slug"] = json!(slug);
    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(&first),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(&first),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "CONFLICT");

    let (status, second) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(article(&unique("Second"))),
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/dashboard/articles/{}", second["id"].as_str().unwrap()))
            .set_json(&first),
    )
    .await;
    assert_eq!(status, 409);
}

#[actix_rt::test]
async fn test_long_cyrillic_title_fits_slug_column() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let title: String = format!("{} Щедрий вечір на кафедрі ", unique("x"))
        .chars()
        .cycle()
        .take(200)
        .collect();
    let (status, body) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(article(&title)),
    )
    .await;

    assert_eq!(status, 201, "{body}");
    let slug = body["slug"].as_str().unwrap();
    assert!(slug.len() <= 220);
    assert!(!slug.ends_with('-'));
}

#[actix_rt::test]
async fn test_publish_unpublish_controls_public_visibility() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, created) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(article(&unique("Draft"))),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let public_uri = format!("/api/v1/articles/{}", created["slug"].as_str().unwrap());

    let (status, _) = send(&app, test::TestRequest::get().uri(&public_uri)).await;
    assert_eq!(status, 404, "drafts are not public");

    let (status, published) = send_as_admin(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/dashboard/articles/{id}/publish")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(published["is_published"], true);
    let first_published_at = published["published_at"].clone();
    assert!(first_published_at.is_string());

    let (status, body) = send(&app, test::TestRequest::get().uri(&public_uri)).await;
    assert_eq!(status, 200);
    assert_eq!(body["content"], "Body text");

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/dashboard/articles/{id}/unpublish")),
    )
    .await;
    assert_eq!(status, 200);
    let (status, _) = send(&app, test::TestRequest::get().uri(&public_uri)).await;
    assert_eq!(status, 404);

    let (_, republished) = send_as_admin(
        &app,
        test::TestRequest::post().uri(&format!("/api/v1/dashboard/articles/{id}/publish")),
    )
    .await;
    assert_eq!(republished["published_at"], first_published_at);

    let actions: Vec<String> = drain_events(&mut rx)
        .iter()
        .map(|e| event_parts(e).1.to_string())
        .collect();
    assert_eq!(actions, ["created", "updated", "updated", "updated"]);
}

#[actix_rt::test]
async fn test_tag_and_search_filters() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, tag) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/tags")
            .set_json(json!({ "name": unique("Filter") })),
    )
    .await;
    let marker = unique("zq");

    let mut tagged = article(&format!("{marker} tagged"));
    tagged["tag_ids"] = json!([tag["id"]]);
    tagged["is_published"] = json!(true);
    let mut untagged = article(&format!("{marker} plain"));
    untagged["is_published"] = json!(true);
    let mut draft = article(&format!("{marker} draft"));
    draft["tag_ids"] = json!([tag["id"]]);

    for body in [&tagged, &untagged, &draft] {
        let (status, _) = send_as_admin(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/dashboard/articles")
                .set_json(body),
        )
        .await;
        assert_eq!(status, 201);
    }

    let (_, by_search) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/articles?search={}", marker.to_uppercase())),
    )
    .await;
    assert_eq!(by_search["total"], 2, "search is case-insensitive and skips drafts");

    let tag_slug = tag["slug"].as_str().unwrap();
    let (_, by_tag) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/articles?tag={tag_slug}")),
    )
    .await;
    assert_eq!(by_tag["total"], 1);
    assert_eq!(by_tag["articles"][0]["tags"][0]["slug"], tag_slug);

    let (_, drafts) = send_as_admin(
        &app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/dashboard/articles?status=draft&search={marker}"
        )),
    )
    .await;
    assert_eq!(drafts["total"], 1);
}

#[actix_rt::test]
async fn test_soft_delete_hides_article() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;

    let mut body = article(&unique("Gone"));
    body["is_published"] = json!(true);
    let (_, created) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(&body),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let dashboard_uri = format!("/api/v1/dashboard/articles/{id}");

    let (status, _) = send_as_admin(&app, test::TestRequest::delete().uri(&dashboard_uri)).await;
    assert_eq!(status, 200);

    let (status, _) = send_as_admin(&app, test::TestRequest::get().uri(&dashboard_uri)).await;
    assert_eq!(status, 404);
    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/articles/{}", created["slug"].as_str().unwrap())),
    )
    .await;
    assert_eq!(status, 404);
    let (status, _) = send_as_admin(&app, test::TestRequest::delete().uri(&dashboard_uri)).await;
    assert_eq!(status, 404);

    let events = drain_events(&mut rx);
    let (resource, action, deleted_id) = event_parts(events.last().unwrap());
    assert_eq!((resource, action, deleted_id), ("articles", "deleted", Some(id.as_str())));
}

#[actix_rt::test]
async fn test_plain_user_cannot_manage_articles() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;
    let user = create_user(&pool, Role::User).await;

    let (status, body) = send_as(
        &app,
        &user,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/articles")
            .set_json(article("Nope")),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "FORBIDDEN");
}
