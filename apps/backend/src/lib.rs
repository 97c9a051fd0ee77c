#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod admin;
pub mod auth;
pub mod db;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod health;
pub mod infra;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

pub use admin::{promote_to_admin, PromotionOutcome};
pub use auth::jwt::{mint_token, verify_token, TokenSubject};
pub use error::AppError;
pub use health::{probe, HealthStatus};
pub use infra::state::build_state;
pub use middleware::RequestTrace;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}
