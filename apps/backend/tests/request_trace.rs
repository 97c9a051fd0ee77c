mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::HttpMessage;
use backend::middleware::{AuthenticatedUserId, TraceId};
use backend_test_support::problem_details::assert_problem_details;

use crate::common::{bearer_for, migrated_db, seed_user, state_for, test_app};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::test_logging::init();
}

#[actix_web::test]
async fn test_authenticated_request_carries_user_id_and_trace_id() {
    let db = migrated_db().await;
    let user = seed_user(&db, "tracy", "user").await;
    let app = test_app(state_for(&db)).await;

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer_for(&user)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let extensions = resp.request().extensions();
    assert_eq!(
        extensions.get::<AuthenticatedUserId>(),
        Some(&AuthenticatedUserId(user.id))
    );
    assert_eq!(extensions.get::<TraceId>().unwrap().0, header);
}

#[actix_web::test]
async fn test_rejected_request_has_no_user_id_and_matching_trace_headers() {
    let db = migrated_db().await;
    let app = test_app(state_for(&db)).await;

    let req = test::TestRequest::get().uri("/api/profile").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp
        .request()
        .extensions()
        .get::<AuthenticatedUserId>()
        .is_none());
    let request_id = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let problem =
        assert_problem_details(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;
    assert_eq!(problem.trace_id, request_id);
}
