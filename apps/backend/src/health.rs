//! Database health probe.

use sea_orm::{ConnectionTrait, Statement};
use tracing::warn;

use crate::state::app_state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// `SELECT 1` succeeded.
    Healthy,
    /// No database is configured for this environment.
    Degraded,
    /// The probe query ran and failed.
    Error(String),
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Error(_) => "error",
        }
    }
}

pub async fn probe(state: &AppState) -> HealthStatus {
    let Some(db) = state.db() else {
        return HealthStatus::Degraded;
    };

    match db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1 AS health_check",
        ))
        .await
    {
        Ok(_) => HealthStatus::Healthy,
        Err(e) => {
            warn!(error = %e, "health probe query failed");
            HealthStatus::Error(e.to_string())
        }
    }
}
