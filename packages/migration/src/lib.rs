pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};

pub mod changes;
pub mod introspect;
pub mod ledger;
pub mod runner;
#[cfg(test)]
mod test_conn;

pub use changes::{find_change, registry, ChangeKind, DefaultValue, SchemaChange};
pub use ledger::{LedgerEntry, LedgerMode};
pub use runner::{apply_change, is_duplicate_structure, ChangeOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationCommand {
    /// Apply every registered change that is not yet present.
    Up,
    /// Apply one change by name.
    Apply(String),
    /// Report presence of every change without mutating anything.
    Status,
}

/// Result of one `migrate` call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MigrationReport {
    pub outcomes: Vec<(&'static str, ChangeOutcome)>,
    /// Populated by `Status` only: change name and whether it is present.
    pub status: Vec<(&'static str, bool)>,
    /// Populated by `Status` only, when the ledger table exists.
    pub ledger: Option<Vec<LedgerEntry>>,
}

impl MigrationReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.executed_ddl()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ChangeOutcome::Skipped))
            .count()
    }

    pub fn already_present_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ChangeOutcome::AlreadyPresent { .. }))
            .count()
    }
}

/// Migration entry point shared by the CLI and tests.
///
/// The caller owns the connection; this function never opens or closes one.
pub async fn migrate(
    db: &DatabaseConnection,
    command: MigrationCommand,
    ledger_mode: LedgerMode,
) -> Result<MigrationReport, DbErr> {
    let db_info_before = get_db_diagnostics(db).await?;

    tracing::info!("▶ cmd={command:?}  profile={}", db_info_before.profile);
    tracing::info!("▶ connected to DB: {}", db_info_before.name);
    tracing::info!(
        "▶ BEFORE: {} change(s) defined, {} present",
        db_info_before.defined_changes_count,
        db_info_before.present_count
    );

    let result = match &command {
        MigrationCommand::Up => apply_all(db, &registry(), ledger_mode).await,
        MigrationCommand::Apply(name) => match find_change(name) {
            Some(change) => apply_all(db, &[change], ledger_mode).await,
            None => Err(DbErr::Custom(format!("unknown schema change '{name}'"))),
        },
        MigrationCommand::Status => status(db).await,
    };

    match result {
        Ok(report) => {
            if !matches!(command, MigrationCommand::Status) {
                let db_info_after = get_db_diagnostics(db).await?;
                tracing::info!(
                    "▶ AFTER: {} change(s) defined, {} present",
                    db_info_after.defined_changes_count,
                    db_info_after.present_count
                );
                tracing::info!(
                    "▶ applied={} skipped={} already_present={}",
                    report.applied_count(),
                    report.skipped_count(),
                    report.already_present_count()
                );
            }
            tracing::info!("✅ {command:?} OK for {}", db_info_before.profile);
            Ok(report)
        }
        Err(e) => {
            tracing::error!("❌ {command:?} failed for {}: {e}", db_info_before.profile);
            Err(e)
        }
    }
}

async fn apply_all<C: ConnectionTrait>(
    db: &C,
    changes: &[SchemaChange],
    ledger_mode: LedgerMode,
) -> Result<MigrationReport, DbErr> {
    if ledger_mode == LedgerMode::Record {
        ledger::ensure_ledger(db).await?;
    }

    let mut report = MigrationReport::default();
    for change in changes {
        let outcome = apply_change(db, change).await?;
        if ledger_mode == LedgerMode::Record && outcome.executed_ddl() {
            ledger::record(db, change.name).await?;
        }
        report.outcomes.push((change.name, outcome));
    }
    Ok(report)
}

async fn status(db: &DatabaseConnection) -> Result<MigrationReport, DbErr> {
    let mut report = MigrationReport::default();
    for change in registry() {
        let present = introspect::is_present(db, &change).await?;
        tracing::info!(
            "  {} {} ({})",
            if present { "✓" } else { "·" },
            change.name,
            change.target()
        );
        report.status.push((change.name, present));
    }

    report.ledger = ledger::read_ledger(db).await?;
    if let Some(entries) = &report.ledger {
        tracing::info!("▶ ledger has {} entr(ies)", entries.len());
        for entry in entries {
            tracing::info!("  {} at {}", entry.name, entry.applied_at);
        }
    }
    Ok(report)
}

#[derive(Debug)]
struct DbDiagnostics {
    profile: String,
    name: String,
    present_count: usize,
    defined_changes_count: usize,
}

async fn get_db_diagnostics(db: &DatabaseConnection) -> Result<DbDiagnostics, DbErr> {
    let profile = format!("{:?}", db.get_database_backend());

    let name = match db.get_database_backend() {
        DatabaseBackend::Postgres => {
            let stmt = Statement::from_string(
                db.get_database_backend(),
                String::from("select current_database() as name"),
            );
            if let Some(row) = db.query_one(stmt).await? {
                row.try_get("", "name")?
            } else {
                "<unknown>".to_string()
            }
        }
        DatabaseBackend::Sqlite => {
            let stmt = Statement::from_string(
                db.get_database_backend(),
                String::from("SELECT file FROM pragma_database_list WHERE name = 'main'"),
            );
            match db.query_one(stmt).await? {
                Some(row) => match row.try_get::<String>("", "file") {
                    Ok(file) if file.is_empty() => ":memory:".to_string(),
                    Ok(file) => file,
                    Err(_) => "<unknown>".to_string(),
                },
                None => "<unknown>".to_string(),
            }
        }
        _ => "<unsupported>".to_string(),
    };

    let changes = registry();
    let mut present_count = 0;
    for change in &changes {
        if introspect::is_present(db, change).await? {
            present_count += 1;
        }
    }

    Ok(DbDiagnostics {
        profile,
        name,
        present_count,
        defined_changes_count: changes.len(),
    })
}

#[cfg(test)]
mod tests {
    use backend_test_support::sqlite::TempSqlite;

    use super::*;
    use crate::test_conn::MetadataBlindConn;

    #[tokio::test]
    async fn already_present_outcome_is_not_recorded_in_ledger() {
        let db = TempSqlite::new().await;
        let conn = db.conn();
        apply_all(conn, &registry(), LedgerMode::Off).await.unwrap();

        // Every metadata lookup now misses, so each column add hits the engine's duplicate error.
        let column_adds: Vec<SchemaChange> = registry()
            .into_iter()
            .filter(|c| matches!(c.kind, ChangeKind::AddColumn { .. }))
            .collect();
        let blind = MetadataBlindConn(conn);
        let report = apply_all(&blind, &column_adds, LedgerMode::Record)
            .await
            .unwrap();

        assert_eq!(report.already_present_count(), column_adds.len());
        assert_eq!(report.applied_count(), 0);
        assert_eq!(ledger::read_ledger(conn).await.unwrap(), Some(vec![]));
    }
}
