//! # archivehub-database
//!
//! PostgreSQL connection management, the directory/file store traits the
//! hierarchy services consume, their PostgreSQL repositories, and an
//! in-memory implementation for tests and offline tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryDirectoryStore, MemoryFileStore};
pub use repositories::{DirectoryRepository, FileRepository};
pub use store::{DirectoryStore, FileStore};
