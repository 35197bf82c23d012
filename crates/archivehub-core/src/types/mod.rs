//! Core type definitions used across the ArchiveHub workspace.

pub mod id;
pub mod patch;

pub use id::*;
pub use patch::Patch;
