//! Promote one user to admin, then exit.
//!
//! Exit codes: 0 when promoted or when the user does not exist, 1 on any
//! configuration, connection or query failure, 2 on bad arguments.

use backend::admin::{promote_to_admin, PromotionOutcome};
use backend::telemetry;
use clap::Parser;
use db_infra::config::db::{DbConfig, PoolPurpose};
use db_infra::with_connection;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "promote-admin")]
#[command(about = "Grant the admin role to a user by username")]
struct Args {
    /// Username to promote
    #[arg(default_value = "admin")]
    username: String,
}

#[tokio::main]
async fn main() {
    telemetry::init_cli_tracing();
    let args = Args::parse();

    let config = DbConfig::from_env();
    let provider = match config.resolve() {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "database configuration error");
            std::process::exit(1);
        }
    };
    info!(db_kind = ?provider.kind(), target = %provider.describe(), "promote-admin: connecting");

    let username = args.username;
    let result = with_connection(provider.as_ref(), PoolPurpose::Migration, |conn| {
        Box::pin(async move { promote_to_admin(conn, &username).await })
    })
    .await;

    match result {
        Ok(PromotionOutcome::Promoted { after, .. }) => {
            info!(username = %after.username, role = %after.role, "promote-admin: done");
        }
        Ok(PromotionOutcome::NotFound) => {
            info!("promote-admin: done, user not found");
        }
        Err(e) => {
            error!(error = %e, "promote-admin failed");
            std::process::exit(1);
        }
    }
}
