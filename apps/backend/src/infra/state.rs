use db_infra::config::db::{DbConfig, PoolPurpose};
use db_infra::DbInfraError;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builds `AppState` for the server and for tests.
pub struct StateBuilder {
    security_config: SecurityConfig,
    db_config: Option<DbConfig>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db_config: None,
        }
    }

    pub fn with_db(mut self, config: DbConfig) -> Self {
        self.db_config = Some(config);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    /// Resolve and open the request pool.
    ///
    /// A production profile without `DATABASE_URL` yields a state with no
    /// database, which the health probe reports as degraded. Any other
    /// resolution or connection failure is returned.
    pub async fn build(self) -> Result<AppState, AppError> {
        let Some(config) = self.db_config else {
            return Ok(AppState::without_db(self.security_config));
        };

        let provider = match config.resolve() {
            Ok(provider) => provider,
            Err(DbInfraError::MissingDatabaseUrl) => {
                warn!(env = ?config.env, "DATABASE_URL not set; serving without a database");
                return Ok(AppState::without_db(self.security_config));
            }
            Err(e) => return Err(e.into()),
        };

        let conn = provider.connect(PoolPurpose::App).await?;
        info!(db_kind = ?provider.kind(), target = %provider.describe(), "app pool ready");
        Ok(AppState::new(conn, self.security_config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
