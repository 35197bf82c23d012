//! # archivehub-core
//!
//! Core crate for ArchiveHub. Contains the cache trait, configuration
//! schemas, typed identifiers, the tri-state [`Patch`](types::Patch) used by
//! partial updates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ArchiveHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
