use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;

/// Shared resources handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// `None` when no database is configured; data routes then answer 503.
    db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, security: SecurityConfig) -> Self {
        Self {
            db: Some(db),
            security,
        }
    }

    pub fn without_db(security: SecurityConfig) -> Self {
        Self { db: None, security }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}
