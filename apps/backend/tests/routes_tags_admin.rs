mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use serde_json::{json, Value};

use crate::common::{bearer_for, migrated_db, seed_user, state_for, test_app};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::test_logging::init();
}

#[actix_web::test]
async fn test_create_and_list_tags() {
    let db = migrated_db().await;
    let user = seed_user(&db, "alice", "user").await;
    let app = test_app(state_for(&db)).await;

    for (name, color) in [("vegan", "#22AA55"), ("  spicy ", "#ff0000")] {
        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(("Authorization", bearer_for(&user)))
            .set_json(json!({ "name": name, "color": color }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/tags")
        .insert_header(("Authorization", bearer_for(&user)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["vegan", "spicy"]);
}

#[actix_web::test]
async fn test_create_tag_validation() {
    let db = migrated_db().await;
    let user = seed_user(&db, "alice", "user").await;
    let app = test_app(state_for(&db)).await;

    let cases = [
        (json!({ "name": "   ", "color": "#000000" }), "INVALID_TAG_NAME"),
        (json!({ "name": "x", "color": "red" }), "INVALID_COLOR"),
        (json!({ "name": "x", "color": "#12345" }), "INVALID_COLOR"),
        (json!({ "name": "x" }), "BAD_REQUEST"),
    ];

    for (payload, code) in cases {
        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(("Authorization", bearer_for(&user)))
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details(resp, code, StatusCode::BAD_REQUEST).await;
    }
}

#[actix_web::test]
async fn test_check_users_requires_admin() {
    let db = migrated_db().await;
    let admin = seed_user(&db, "root", "admin").await;
    let user = seed_user(&db, "alice", "user").await;
    let app = test_app(state_for(&db)).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", bearer_for(&user)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "FORBIDDEN_ADMIN_ONLY", StatusCode::FORBIDDEN).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["username"], "root");
    assert_eq!(body[0]["role"], "admin");
    assert_eq!(body[1]["role"], "user");
}
