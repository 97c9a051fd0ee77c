//! Live schema introspection, one query per dialect.

use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement, Value};

use crate::changes::{ChangeKind, SchemaChange};

async fn count<C: ConnectionTrait>(conn: &C, sql: &str, values: Vec<Value>) -> Result<i64, DbErr> {
    let backend = conn.get_database_backend();
    let row = conn
        .query_one(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    match row {
        Some(row) => row.try_get::<i64>("", "cnt"),
        None => Ok(0),
    }
}

pub async fn table_exists<C: ConnectionTrait>(conn: &C, table: &str) -> Result<bool, DbErr> {
    let sql = match conn.get_database_backend() {
        DatabaseBackend::Sqlite => {
            "SELECT COUNT(*) AS cnt FROM sqlite_master WHERE type = 'table' AND name = ?"
        }
        DatabaseBackend::Postgres => {
            "SELECT COUNT(*) AS cnt FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
        _ => return Err(DbErr::Custom("Unsupported database backend".into())),
    };
    Ok(count(conn, sql, vec![table.into()]).await? > 0)
}

pub async fn column_exists<C: ConnectionTrait>(
    conn: &C,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    let sql = match conn.get_database_backend() {
        DatabaseBackend::Sqlite => {
            "SELECT COUNT(*) AS cnt FROM pragma_table_info(?) WHERE name = ?"
        }
        DatabaseBackend::Postgres => {
            "SELECT COUNT(*) AS cnt FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2"
        }
        _ => return Err(DbErr::Custom("Unsupported database backend".into())),
    };
    Ok(count(conn, sql, vec![table.into(), column.into()]).await? > 0)
}

/// Whether the structure a change introduces is already in place.
pub async fn is_present<C: ConnectionTrait>(conn: &C, change: &SchemaChange) -> Result<bool, DbErr> {
    match change.kind {
        ChangeKind::CreateTable(_) => table_exists(conn, change.table).await,
        ChangeKind::AddColumn { column, .. } => column_exists(conn, change.table, column).await,
    }
}
