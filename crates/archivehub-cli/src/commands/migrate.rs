//! Database migration commands.

use clap::{Args, Subcommand};

use archivehub_core::config::AppConfig;
use archivehub_core::result::AppResult;
use archivehub_database::DatabasePool;
use archivehub_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied.");
        }
    }

    pool.close().await;
    Ok(())
}
