//! PostgreSQL implementations of the directory and file stores.

pub mod directory;
pub mod file;

pub use directory::DirectoryRepository;
pub use file::FileRepository;

use archivehub_core::error::{AppError, ErrorKind};

/// Map an insert/update failure, turning unique-constraint hits into conflicts.
fn map_write_err(e: sqlx::Error, context: &'static str, target: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            AppError::with_source(
                ErrorKind::Conflict,
                format!("'{target}' already exists ({constraint})"),
                e,
            )
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
