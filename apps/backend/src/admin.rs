//! Operator task: promote a user to the admin role by username.
//!
//! There is no authorization gate; the caller is whoever can run the
//! binary against the database.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::info;

use crate::error::AppError;
use crate::repos::users::{self, User, ADMIN_ROLE};

#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// The row was updated. A user who was already admin still has
    /// `updatedAt` refreshed.
    Promoted { before: User, after: User },
    /// No user has that username; nothing was written.
    NotFound,
}

pub async fn promote_to_admin<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<PromotionOutcome, AppError> {
    let Some(before) = users::find_user_by_username(conn, username).await? else {
        info!(username, "promote-admin: no such user, nothing to do");
        return Ok(PromotionOutcome::NotFound);
    };
    info!(
        id = before.id,
        username = %before.username,
        role = %before.role,
        updated_at = %before.updated_at,
        "promote-admin: before"
    );

    let after = users::set_role(conn, before.id, ADMIN_ROLE, OffsetDateTime::now_utc()).await?;
    info!(
        id = after.id,
        username = %after.username,
        role = %after.role,
        updated_at = %after.updated_at,
        "promote-admin: after"
    );

    Ok(PromotionOutcome::Promoted { before, after })
}
