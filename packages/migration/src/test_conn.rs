//! Connection wrapper for exercising the race path of `apply_change`.

use sea_orm_migration::sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, ExecResult, QueryResult,
    Statement,
};

/// Delegates everything to the inner connection, except that metadata
/// lookups always count zero. The runner then believes structure is absent
/// that the database already has, as a concurrent runner would.
pub(crate) struct MetadataBlindConn<'a>(pub &'a DatabaseConnection);

fn is_metadata_lookup(sql: &str) -> bool {
    sql.contains("pragma_table_info")
        || sql.contains("sqlite_master")
        || sql.contains("information_schema")
}

#[async_trait::async_trait]
impl<'a> ConnectionTrait for MetadataBlindConn<'a> {
    fn get_database_backend(&self) -> DatabaseBackend {
        self.0.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.0.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.0.execute_unprepared(sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        if is_metadata_lookup(&stmt.sql) {
            let zero = Statement::from_string(self.get_database_backend(), "SELECT 0 AS cnt");
            return self.0.query_one(zero).await;
        }
        self.0.query_one(stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.0.query_all(stmt).await
    }
}
