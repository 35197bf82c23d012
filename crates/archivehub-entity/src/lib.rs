//! # archivehub-entity
//!
//! Domain entity models for ArchiveHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; the computed tree fields are skipped
//! by sqlx and only populated during tree assembly.

pub mod directory;
pub mod file;
