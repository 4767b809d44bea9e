//! Subjects and employees, and the links between them.

use actix_web::test;
use department_site::services::EventBroadcaster;
use serde_json::{Value, json};

use super::test_helpers::*;

fn find_by_id<'a>(list: &'a Value, id: &str) -> Option<&'a Value> {
    list.as_array()?.iter().find(|item| item["id"] == id)
}

#[actix_rt::test]
async fn test_duplicate_subject_name_is_conflict() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let name = unique("Compilers");
    for expected in [201, 409] {
        let (status, _) = send_as_admin(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/dashboard/subjects")
                .set_json(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, expected);
    }
}

#[actix_rt::test]
async fn test_employee_subjects_and_subject_delete() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let mut rx = broadcaster.subscribe();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, subject) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/subjects")
            .set_json(json!({ "name": unique("Operating Systems"), "description": "Kernels" })),
    )
    .await;
    let subject_id = subject["id"].as_str().unwrap().to_string();

    let full_name = unique("Ada Lovelace");
    let (status, employee) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/employees")
            .set_json(json!({
                "full_name": full_name,
                "position": "Associate Professor",
                "email": "",
                "subject_ids": [subject_id, subject_id],
            })),
    )
    .await;
    assert_eq!(status, 201, "{employee}");
    assert!(employee["email"].is_null(), "blank email is stored as none");
    assert_eq!(employee["subjects"].as_array().unwrap().len(), 1);
    let employee_id = employee["id"].as_str().unwrap().to_string();

    let (_, subjects) = send(&app, test::TestRequest::get().uri("/api/v1/subjects")).await;
    let listed = find_by_id(&subjects["subjects"], &subject_id).expect("subject is listed");
    assert_eq!(listed["teachers"][0]["full_name"], full_name.as_str());

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::delete().uri(&format!("/api/v1/dashboard/subjects/{subject_id}")),
    )
    .await;
    assert_eq!(status, 200);

    let (status, employee) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/employees/{employee_id}")),
    )
    .await;
    assert_eq!(status, 200);
    assert!(employee["subjects"].as_array().unwrap().is_empty());

    let parts: Vec<_> = drain_events(&mut rx)
        .iter()
        .map(|e| {
            let (resource, action, _) = event_parts(e);
            (resource.to_string(), action.to_string())
        })
        .collect();
    assert_eq!(
        parts,
        [
            ("subjects".to_string(), "created".to_string()),
            ("employees".to_string(), "created".to_string()),
            ("subjects".to_string(), "updated".to_string()),
            ("subjects".to_string(), "deleted".to_string()),
            ("employees".to_string(), "updated".to_string()),
        ]
    );
}

#[actix_rt::test]
async fn test_unknown_subject_is_rejected() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (status, body) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/employees")
            .set_json(json!({
                "full_name": unique("Grace Hopper"),
                "position": "Lecturer",
                "subject_ids": [uuid::Uuid::now_v7()],
            })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_deleted_employee_is_hidden() {
    let Some(pool) = test_pool().await else { return };
    let broadcaster = EventBroadcaster::new();
    let app = create_test_app(&pool, &broadcaster).await;

    let (_, employee) = send_as_admin(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/dashboard/employees")
            .set_json(json!({ "full_name": unique("Temp"), "position": "Assistant" })),
    )
    .await;
    let id = employee["id"].as_str().unwrap().to_string();

    let (status, _) = send_as_admin(
        &app,
        test::TestRequest::delete().uri(&format!("/api/v1/dashboard/employees/{id}")),
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/api/v1/employees/{id}"))).await;
    assert_eq!(status, 404);

    let (_, list) = send(&app, test::TestRequest::get().uri("/api/v1/employees")).await;
    assert!(find_by_id(&list["employees"], &id).is_none());
}
