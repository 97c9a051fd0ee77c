mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use backend::health::{probe, HealthStatus};
use backend::infra::state::build_state;
use backend::state::app_state::AppState;
use db_infra::config::db::DbConfig;
use serde_json::Value;

use crate::common::{migrated_db, security, state_for, test_app};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::test_logging::init();
}

#[tokio::test]
async fn test_no_connection_string_is_degraded() {
    let config = DbConfig::from_lookup(|name| match name {
        "NODE_ENV" => Some("production".to_string()),
        _ => None,
    });
    let state = build_state()
        .with_db(config)
        .with_security(security())
        .build()
        .await
        .unwrap();

    assert_eq!(probe(&state).await, HealthStatus::Degraded);
}

#[tokio::test]
async fn test_live_database_is_healthy() {
    let db = migrated_db().await;
    assert_eq!(probe(&state_for(&db)).await, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_closed_pool_is_error() {
    let db = migrated_db().await;
    let state = state_for(&db);
    db.conn().clone().close().await.unwrap();

    assert!(matches!(probe(&state).await, HealthStatus::Error(_)));
}

#[actix_web::test]
async fn test_health_route_status_codes() {
    let app = test_app(AppState::without_db(security())).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db"], "not_configured");
    assert!(body.get("db_error").is_none());

    let db = migrated_db().await;
    let app = test_app(state_for(&db)).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));
}
