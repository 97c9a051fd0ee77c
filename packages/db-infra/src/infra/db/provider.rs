//! Connection providers, one per dialect.
//!
//! A provider is chosen once from [`DbConfig::resolve`](crate::config::db::DbConfig::resolve)
//! and passed to whatever needs a connection, so nothing downstream branches
//! on the deployment environment.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::{debug, info};

use crate::config::db::{build_session_statements, pool_settings, DbKind, PoolPurpose};
use crate::error::DbInfraError;
use crate::infra::db::core::sanitize_db_url;

#[async_trait]
pub trait ConnectionProvider: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> DbKind;

    /// Connection target with credentials masked.
    fn describe(&self) -> String;

    /// Open a new pool. Fails immediately on error; nothing is retried.
    async fn connect(&self, purpose: PoolPurpose) -> Result<DatabaseConnection, DbInfraError>;
}

/// Embedded SQLite database stored in a local file.
#[derive(Debug, Clone)]
pub struct SqliteFileProvider {
    path: PathBuf,
}

impl SqliteFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn url(&self) -> String {
        // mode=rwc creates the file on first use
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

#[async_trait]
impl ConnectionProvider for SqliteFileProvider {
    fn kind(&self) -> DbKind {
        DbKind::SqliteFile
    }

    fn describe(&self) -> String {
        format!("sqlite file {}", self.path.display())
    }

    async fn connect(&self, purpose: PoolPurpose) -> Result<DatabaseConnection, DbInfraError> {
        open_pool(&self.url(), self.kind(), purpose, &self.describe()).await
    }
}

/// Networked PostgreSQL database reached through a connection string.
#[derive(Clone)]
pub struct PostgresProvider {
    url: String,
}

impl PostgresProvider {
    pub fn new(url: &str) -> Result<Self, DbInfraError> {
        let url = url.trim();
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(DbInfraError::Config {
                message: format!(
                    "DATABASE_URL must be a postgres:// or postgresql:// URL, got '{}'",
                    sanitize_db_url(url)
                ),
            });
        }
        Ok(Self {
            url: url.to_string(),
        })
    }
}

impl std::fmt::Debug for PostgresProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresProvider")
            .field("url", &sanitize_db_url(&self.url))
            .finish()
    }
}

#[async_trait]
impl ConnectionProvider for PostgresProvider {
    fn kind(&self) -> DbKind {
        DbKind::Postgres
    }

    fn describe(&self) -> String {
        sanitize_db_url(&self.url)
    }

    async fn connect(&self, purpose: PoolPurpose) -> Result<DatabaseConnection, DbInfraError> {
        open_pool(&self.url, self.kind(), purpose, &self.describe()).await
    }
}

async fn open_pool(
    url: &str,
    kind: DbKind,
    purpose: PoolPurpose,
    target: &str,
) -> Result<DatabaseConnection, DbInfraError> {
    let settings = pool_settings(kind, purpose);

    let mut opt = ConnectOptions::new(url);
    opt.min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .sqlx_logging(false);

    let conn = Database::connect(opt)
        .await
        .map_err(|e| DbInfraError::Connect {
            message: format!("failed to connect to {target}: {e}"),
        })?;

    for stmt in build_session_statements(kind, purpose) {
        if let Err(e) = conn
            .execute(Statement::from_string(kind.into(), stmt))
            .await
        {
            let _ = conn.close().await;
            return Err(DbInfraError::Connect {
                message: format!("failed to apply session setting '{stmt}' on {target}: {e}"),
            });
        }
        debug!(db_kind = ?kind, stmt, "session setting applied");
    }

    info!(
        db_kind = ?kind,
        purpose = ?purpose,
        target = target,
        max_connections = settings.max_connections,
        "db=connected"
    );
    Ok(conn)
}
