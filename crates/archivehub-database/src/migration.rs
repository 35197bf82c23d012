//! Schema migrations for the `directories` and `files` tables.
//!
//! The SQL lives in the workspace `migrations/` directory and is embedded
//! into the binary at compile time, so `archivehub migrate run` needs no
//! files on disk.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use archivehub_core::error::{AppError, ErrorKind};

/// The embedded hierarchy schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the hierarchy schema up to date. Already applied versions are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    info!(
        embedded = MIGRATOR.iter().count(),
        latest, "Applying hierarchy schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to migrate hierarchy schema: {e}"),
            e,
        )
    })?;

    info!(latest, "Hierarchy schema is up to date");
    Ok(())
}
