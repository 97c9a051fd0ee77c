use std::path::PathBuf;

use migration::LedgerMode;
use sea_orm::DatabaseBackend;

use crate::error::DbInfraError;
use crate::infra::db::provider::{ConnectionProvider, PostgresProvider, SqliteFileProvider};

/// SQLite file used in development when `SQLITE_DB_FILE` is unset.
pub const DEFAULT_SQLITE_FILE: &str = "sqlite.db";

/// Deployment profile, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Production,
}

impl RuntimeEnv {
    /// `production` selects Production; anything else, including unset, is Development.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("production") => RuntimeEnv::Production,
            _ => RuntimeEnv::Development,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    SqliteFile,
    Postgres,
}

impl From<DbKind> for DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::SqliteFile => DatabaseBackend::Sqlite,
            DbKind::Postgres => DatabaseBackend::Postgres,
        }
    }
}

/// What a pool is for; decides its size and session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPurpose {
    /// One-shot processes: migrations and admin tasks. Exactly one connection.
    Migration,
    /// The request-serving pool.
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
}

pub fn pool_settings(kind: DbKind, purpose: PoolPurpose) -> PoolSettings {
    match (kind, purpose) {
        (_, PoolPurpose::Migration) => PoolSettings {
            min_connections: 1,
            max_connections: 1,
        },
        (DbKind::SqliteFile, PoolPurpose::App) => PoolSettings {
            min_connections: 1,
            max_connections: 4,
        },
        (DbKind::Postgres, PoolPurpose::App) => PoolSettings {
            min_connections: 1,
            max_connections: 10,
        },
    }
}

/// Session statements for single-connection pools.
///
/// Larger pools skip them: a session setting would reach only whichever
/// connection happened to run it.
pub fn build_session_statements(kind: DbKind, purpose: PoolPurpose) -> Vec<&'static str> {
    match (kind, purpose) {
        (DbKind::SqliteFile, PoolPurpose::Migration) => vec!["PRAGMA foreign_keys = ON;"],
        (DbKind::Postgres, PoolPurpose::Migration) => {
            vec!["SET application_name = 'meal-tracker-migrate';"]
        }
        (_, PoolPurpose::App) => Vec::new(),
    }
}

/// Database configuration read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub env: RuntimeEnv,
    pub database_url: Option<String>,
    pub sqlite_file: Option<String>,
    pub ledger: LedgerMode,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("env", &self.env)
            .field(
                "database_url",
                &self.database_url.as_deref().map(crate::sanitize_db_url),
            )
            .field("sqlite_file", &self.sqlite_file)
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl DbConfig {
    /// Read `NODE_ENV`, `DATABASE_URL`, `SQLITE_DB_FILE` and `MIGRATION_LEDGER`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            env: RuntimeEnv::from_node_env(lookup("NODE_ENV").as_deref()),
            database_url: non_blank("DATABASE_URL"),
            sqlite_file: non_blank("SQLITE_DB_FILE"),
            ledger: lookup("MIGRATION_LEDGER")
                .map(|v| LedgerMode::parse(&v))
                .unwrap_or_default(),
        }
    }

    pub fn db_kind(&self) -> DbKind {
        match self.env {
            RuntimeEnv::Development => DbKind::SqliteFile,
            RuntimeEnv::Production => DbKind::Postgres,
        }
    }

    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(self.sqlite_file.as_deref().unwrap_or(DEFAULT_SQLITE_FILE))
    }

    /// Pick the connection provider for this environment. Performs no I/O.
    pub fn resolve(&self) -> Result<Box<dyn ConnectionProvider>, DbInfraError> {
        match self.db_kind() {
            DbKind::SqliteFile => Ok(Box::new(SqliteFileProvider::new(self.sqlite_path()))),
            DbKind::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or(DbInfraError::MissingDatabaseUrl)?;
                Ok(Box::new(PostgresProvider::new(url)?))
            }
        }
    }
}
