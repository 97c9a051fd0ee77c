//! Optional record of applied changes.
//!
//! Rows are written after a change applies. Nothing reads the ledger to
//! decide whether a change should run; presence is always re-derived from
//! live metadata.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbErr};
use time::OffsetDateTime;

use crate::introspect::table_exists;

pub const LEDGER_TABLE: &str = "schema_change_ledger";

#[derive(Iden)]
enum SchemaChangeLedger {
    Table,
    Id,
    Name,
    AppliedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerMode {
    #[default]
    Off,
    Record,
}

impl LedgerMode {
    /// `1`, `true`, `yes` and `on` enable recording.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => LedgerMode::Record,
            _ => LedgerMode::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub name: String,
    pub applied_at: OffsetDateTime,
}

/// Creates the ledger table when absent. Issues no DDL once it exists.
pub async fn ensure_ledger<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    if table_exists(conn, LEDGER_TABLE).await? {
        return Ok(());
    }

    let stmt = Table::create()
        .table(SchemaChangeLedger::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(SchemaChangeLedger::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(SchemaChangeLedger::Name).string().not_null())
        .col(
            ColumnDef::new(SchemaChangeLedger::AppliedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned();
    conn.execute(conn.get_database_backend().build(&stmt)).await?;
    Ok(())
}

pub async fn record<C: ConnectionTrait>(conn: &C, name: &str) -> Result<(), DbErr> {
    let mut stmt = Query::insert();
    stmt.into_table(SchemaChangeLedger::Table)
        .columns([SchemaChangeLedger::Name, SchemaChangeLedger::AppliedAt]);
    stmt.values([name.into(), OffsetDateTime::now_utc().into()])
        .map_err(|e| DbErr::Custom(format!("failed to build ledger insert: {e}")))?;
    conn.execute(conn.get_database_backend().build(&stmt)).await?;
    Ok(())
}

/// Ledger rows oldest first, or `None` when the ledger table was never created.
pub async fn read_ledger<C: ConnectionTrait>(conn: &C) -> Result<Option<Vec<LedgerEntry>>, DbErr> {
    if !table_exists(conn, LEDGER_TABLE).await? {
        return Ok(None);
    }

    let stmt = Query::select()
        .columns([SchemaChangeLedger::Name, SchemaChangeLedger::AppliedAt])
        .from(SchemaChangeLedger::Table)
        .order_by(SchemaChangeLedger::Id, Order::Asc)
        .to_owned();
    let rows = conn.query_all(conn.get_database_backend().build(&stmt)).await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        entries.push(LedgerEntry {
            name: row.try_get("", "name")?,
            applied_at: row.try_get("", "applied_at")?,
        });
    }
    Ok(Some(entries))
}
