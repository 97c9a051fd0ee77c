use sea_orm_migration::sea_orm::{ConnectionTrait, DbErr};
use tracing::{error, info};

use crate::changes::SchemaChange;
use crate::introspect;

/// What happened when a change was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// DDL executed; `backfilled` rows received the default.
    Applied { backfilled: u64 },
    /// Introspection found the structure; nothing was executed.
    Skipped,
    /// Introspection missed it but the DDL reported a duplicate.
    AlreadyPresent { backfilled: u64 },
}

impl ChangeOutcome {
    pub fn executed_ddl(&self) -> bool {
        matches!(self, ChangeOutcome::Applied { .. })
    }
}

/// True for the errors engines raise when the column or table being
/// created already exists.
pub fn is_duplicate_structure(err: &DbErr) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("duplicate column") || msg.contains("already exists")
}

/// Apply one change if its structure is absent.
///
/// There is no lock between the presence check and the DDL. Two runners
/// racing on the same change both end in success: the loser's duplicate
/// error is reported as [`ChangeOutcome::AlreadyPresent`].
pub async fn apply_change<C: ConnectionTrait>(
    conn: &C,
    change: &SchemaChange,
) -> Result<ChangeOutcome, DbErr> {
    let target = change.target();

    if introspect::is_present(conn, change).await? {
        info!(change = change.name, target = %target, "schema_change=skipped present=true");
        return Ok(ChangeOutcome::Skipped);
    }

    let backend = conn.get_database_backend();
    let tolerated = match conn.execute(change.ddl(backend)).await {
        Ok(_) => false,
        Err(e) if is_duplicate_structure(&e) => {
            info!(
                change = change.name,
                target = %target,
                error = %e,
                "schema_change=already_exists treated_as=success"
            );
            true
        }
        Err(e) => {
            error!(change = change.name, target = %target, error = %e, "schema_change=ddl_failed");
            return Err(e);
        }
    };

    let backfilled = match change.backfill(backend) {
        Some(stmt) => match conn.execute(stmt).await {
            Ok(res) => res.rows_affected(),
            Err(e) => {
                error!(change = change.name, target = %target, error = %e, "schema_change=backfill_failed");
                return Err(e);
            }
        },
        None => 0,
    };

    if tolerated {
        Ok(ChangeOutcome::AlreadyPresent { backfilled })
    } else {
        info!(
            change = change.name,
            target = %target,
            backfilled = backfilled,
            "schema_change=applied"
        );
        Ok(ChangeOutcome::Applied { backfilled })
    }
}
