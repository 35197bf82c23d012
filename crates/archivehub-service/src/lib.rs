//! # archivehub-service
//!
//! The archive hierarchy services. [`DirectoryService`] owns directory
//! lifecycle, path relocation, breadcrumbs, and the cached nested tree;
//! [`FileService`] owns file lifecycle and remote metadata inference and
//! delegates tree-cache invalidation to the directory service.
//!
//! Stores, the optional cache and the metadata probe are injected at
//! construction time as `Arc` trait objects.

pub mod directory;
pub mod file;
pub mod metadata;
pub mod path;
pub mod slug;

pub use directory::{
    CreateDirectoryRequest, DirectoryService, TreeCache, UpdateDirectoryRequest,
};
pub use file::{CreateFileRequest, FileService, UpdateFileRequest};
pub use metadata::{HttpMetadataProbe, MetadataProbe, RemoteMetadata};
