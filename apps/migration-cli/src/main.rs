use clap::{Parser, Subcommand};
use db_infra::config::db::DbConfig;
use db_infra::orchestrate_migration;
use migration::MigrationCommand;
use tracing::{error, info};

#[derive(Subcommand, Clone)]
enum Command {
    /// Apply every schema change that is not yet present (default)
    Up,
    /// Show which schema changes are present
    Status,
    /// Apply one schema change by name
    Apply { name: String },
}

#[derive(Parser)]
#[command(name = "migration")]
#[command(about = "Meal tracker schema migration tool")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    // clap exits with status 2 on usage errors
    let args = Args::parse();

    let command = match args.command.unwrap_or(Command::Up) {
        Command::Up => MigrationCommand::Up,
        Command::Status => MigrationCommand::Status,
        Command::Apply { name } => MigrationCommand::Apply(name),
    };

    let config = DbConfig::from_env();
    let report = match orchestrate_migration(&config, command).await {
        Ok(report) => report,
        Err(e) => {
            error!("Migration failed: {e}");
            std::process::exit(1);
        }
    };

    for (name, present) in &report.status {
        info!("{} {name}", if *present { "present" } else { "missing" });
    }
    if let Some(entries) = &report.ledger {
        for entry in entries {
            info!("ledger {} applied_at={}", entry.name, entry.applied_at);
        }
    }
    if !report.outcomes.is_empty() {
        info!(
            "applied={} skipped={} already_present={}",
            report.applied_count(),
            report.skipped_count(),
            report.already_present_count()
        );
    }
}
