//! Directory lifecycle, relocation and tree services.

pub mod service;
pub mod tree;

pub use service::{CreateDirectoryRequest, DirectoryService, UpdateDirectoryRequest};
pub use tree::{TreeCache, assemble_tree};
