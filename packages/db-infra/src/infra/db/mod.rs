pub mod core;
pub mod provider;

pub use core::{orchestrate_migration, orchestrate_migration_with, with_connection};
pub use provider::{ConnectionProvider, PostgresProvider, SqliteFileProvider};
