use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use migration::{migrate, LedgerMode, MigrationCommand, MigrationReport};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, warn};

use crate::config::db::{DbConfig, PoolPurpose};
use crate::error::DbInfraError;
use crate::infra::db::provider::ConnectionProvider;

/// Future returned by a [`with_connection`] body, borrowing the connection.
pub type ConnFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'c>>;

/// Mask the password in a connection string for logs and errors.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((scheme, credentials)) = auth_part.split_once("://") else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _password)) => format!("{scheme}://{user}:***@{host_part}"),
        None => url.to_string(),
    }
}

/// Open a connection, run `f` with it, and close it on every exit path.
///
/// The body's result is returned as-is. A failure to close is logged and
/// never replaces the body's result.
pub async fn with_connection<T, E, F>(
    provider: &dyn ConnectionProvider,
    purpose: PoolPurpose,
    f: F,
) -> Result<T, E>
where
    E: From<DbInfraError>,
    F: for<'c> FnOnce(&'c DatabaseConnection) -> ConnFuture<'c, T, E>,
{
    let conn = provider.connect(purpose).await?;
    let result = f(&conn).await;

    match conn.close().await {
        Ok(()) => debug!(target = %provider.describe(), "db=released"),
        Err(e) => warn!(target = %provider.describe(), error = %e, "db=release_failed"),
    }

    result
}

/// Resolve the provider from configuration and run one migration command.
pub async fn orchestrate_migration(
    config: &DbConfig,
    command: MigrationCommand,
) -> Result<MigrationReport, DbInfraError> {
    let provider = config.resolve()?;
    info!(env = ?config.env, db_kind = ?provider.kind(), "migrate=resolved");
    orchestrate_migration_with(provider.as_ref(), command, config.ledger).await
}

pub async fn orchestrate_migration_with(
    provider: &dyn ConnectionProvider,
    command: MigrationCommand,
    ledger: LedgerMode,
) -> Result<MigrationReport, DbInfraError> {
    let start = Instant::now();
    info!(
        "migrate=start db_kind={:?} target={} ledger={:?}",
        provider.kind(),
        provider.describe(),
        ledger
    );

    let result = with_connection(provider, PoolPurpose::Migration, move |conn| {
        Box::pin(async move {
            migrate(conn, command, ledger)
                .await
                .map_err(|e| DbInfraError::Migration {
                    message: format!("migration execution failed: {e}"),
                })
        })
    })
    .await;

    if let Err(ref e) = result {
        let msg = e.to_string();
        if msg.contains("database is locked") || msg.contains("SQLITE_BUSY") {
            error!("sqlite_busy op=migrate err={e}");
        }
    }

    info!(elapsed_ms = start.elapsed().as_millis(), "migrate=done");
    result
}
