//! Scoped acquisition and migration orchestration against SQLite files.

use db_infra::config::db::{DbConfig, PoolPurpose};
use db_infra::{
    orchestrate_migration, orchestrate_migration_with, with_connection, ConnectionProvider,
    DbInfraError, SqliteFileProvider,
};
use migration::{registry, LedgerMode, MigrationCommand};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serial_test::serial;

#[ctor::ctor]
fn init_logging() {
    backend_test_support::test_logging::init();
}

fn temp_provider() -> (tempfile::TempDir, SqliteFileProvider) {
    let dir = tempfile::tempdir().expect("temp dir");
    let provider = SqliteFileProvider::new(dir.path().join("meals.db"));
    (dir, provider)
}

#[derive(Debug)]
enum ScopeErr {
    Infra(DbInfraError),
    Body(DatabaseConnection),
}

impl From<DbInfraError> for ScopeErr {
    fn from(e: DbInfraError) -> Self {
        ScopeErr::Infra(e)
    }
}

#[tokio::test]
async fn test_sqlite_file_is_created_on_connect() {
    let (_dir, provider) = temp_provider();
    assert!(!provider.path().exists());

    let one = with_connection::<i32, DbInfraError, _>(&provider, PoolPurpose::App, |conn| {
        Box::pin(async move {
            let row = conn
                .query_one(sea_orm::Statement::from_string(
                    conn.get_database_backend(),
                    "SELECT 1 AS one",
                ))
                .await
                .map_err(|e| DbInfraError::Connect {
                    message: e.to_string(),
                })?
                .expect("one row");
            row.try_get::<i32>("", "one")
                .map_err(|e| DbInfraError::Connect {
                    message: e.to_string(),
                })
        })
    })
    .await
    .unwrap();

    assert_eq!(one, 1);
    assert!(provider.path().exists());
}

#[tokio::test]
async fn test_connection_closed_after_success() {
    let (_dir, provider) = temp_provider();

    let leaked = with_connection(&provider, PoolPurpose::Migration, |conn| {
        let conn = conn.clone();
        Box::pin(async move { Ok::<_, DbInfraError>(conn) })
    })
    .await
    .unwrap();

    assert!(leaked.execute_unprepared("SELECT 1").await.is_err());
}

#[tokio::test]
async fn test_connection_closed_after_failure() {
    let (_dir, provider) = temp_provider();

    let result: Result<(), ScopeErr> = with_connection(&provider, PoolPurpose::Migration, |conn| {
        let conn = conn.clone();
        Box::pin(async move { Err(ScopeErr::Body(conn)) })
    })
    .await;

    match result {
        Err(ScopeErr::Body(leaked)) => {
            assert!(leaked.execute_unprepared("SELECT 1").await.is_err());
        }
        other => panic!("expected the body's error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_orchestrated_up_is_idempotent() {
    let (_dir, provider) = temp_provider();

    let first = orchestrate_migration_with(&provider, MigrationCommand::Up, LedgerMode::Off)
        .await
        .unwrap();
    assert_eq!(first.applied_count(), registry().len());

    let second = orchestrate_migration_with(&provider, MigrationCommand::Up, LedgerMode::Off)
        .await
        .unwrap();
    assert_eq!(second.applied_count(), 0);
    assert_eq!(second.skipped_count(), registry().len());
}

#[tokio::test]
async fn test_orchestrate_from_development_config() {
    let (dir, _) = temp_provider();
    let path = dir.path().join("dev.db");
    let path_str = path.to_string_lossy().to_string();

    let config = DbConfig::from_lookup(|name| match name {
        "NODE_ENV" => Some("development".to_string()),
        "SQLITE_DB_FILE" => Some(path_str.clone()),
        _ => None,
    });

    let report = orchestrate_migration(&config, MigrationCommand::Status)
        .await
        .unwrap();
    assert!(report.status.iter().all(|(_, present)| !present));
    assert!(path.exists());
}

#[tokio::test]
#[serial]
async fn test_production_without_url_fails_before_io() {
    std::env::set_var("NODE_ENV", "production");
    std::env::remove_var("DATABASE_URL");

    let config = DbConfig::from_env();
    let err = orchestrate_migration(&config, MigrationCommand::Up)
        .await
        .unwrap_err();

    std::env::remove_var("NODE_ENV");
    assert!(matches!(err, DbInfraError::MissingDatabaseUrl), "{err}");
}

#[tokio::test]
async fn test_provider_describe_names_file() {
    let (_dir, provider) = temp_provider();
    assert!(provider.describe().contains("meals.db"));
}
