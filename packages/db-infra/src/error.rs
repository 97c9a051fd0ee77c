use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbInfraError {
    /// Production was selected but no connection string is available.
    #[error("Configuration error: DATABASE_URL must be set when NODE_ENV=production")]
    MissingDatabaseUrl,
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Connection error: {message}")]
    Connect { message: String },
    #[error("Migration error: {message}")]
    Migration { message: String },
}

impl DbInfraError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            DbInfraError::MissingDatabaseUrl | DbInfraError::Config { .. }
        )
    }
}
