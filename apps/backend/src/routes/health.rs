use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::health::{probe, HealthStatus};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    db: &'static str,
    time: String,
    app_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
}

async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let status = probe(&app_state).await;

    let (code, db) = match &status {
        HealthStatus::Healthy => (StatusCode::OK, "ok"),
        HealthStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
        HealthStatus::Error(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };

    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let body = HealthResponse {
        status: status.as_str(),
        db,
        time,
        app_version: env!("CARGO_PKG_VERSION"),
        db_error: match status {
            HealthStatus::Error(detail) => Some(detail),
            _ => None,
        },
    };

    HttpResponse::build(code).json(body)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
