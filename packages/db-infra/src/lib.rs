//! Shared database configuration, connection resolution and migration orchestration.
//! Used by the backend, the admin task and the migration CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db;
pub use error::DbInfraError;
pub use infra::db::core::{
    orchestrate_migration, orchestrate_migration_with, sanitize_db_url, with_connection,
};
pub use infra::db::provider::{ConnectionProvider, PostgresProvider, SqliteFileProvider};
