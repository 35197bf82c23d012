//! Persistence interfaces consumed by the hierarchy services.
//!
//! Lookups report a missing record as `Ok(None)`; every other failure is an
//! error the services propagate unchanged. Path arguments are compared
//! case-insensitively by every implementation.

use async_trait::async_trait;

use archivehub_core::result::AppResult;
use archivehub_core::types::{DirectoryId, FileId};
use archivehub_entity::directory::{CreateDirectory, Directory};
use archivehub_entity::file::{CreateFile, File};

/// Storage of directory records.
#[async_trait]
pub trait DirectoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a directory by ID.
    async fn find_by_id(&self, id: DirectoryId) -> AppResult<Option<Directory>>;

    /// Find a directory by its materialized path.
    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>>;

    /// List the direct children of `parent_id`, or the roots when `None`.
    async fn list_by_parent(&self, parent_id: Option<DirectoryId>) -> AppResult<Vec<Directory>>;

    /// List every directory.
    async fn list_all(&self) -> AppResult<Vec<Directory>>;

    /// List every directory whose path starts with `prefix` (a literal prefix,
    /// usually `"<path>/"`).
    async fn list_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Directory>>;

    /// Whether a sibling under `parent_id` already uses `slug`, ignoring `exclude`.
    async fn exists_by_parent_and_slug(
        &self,
        parent_id: Option<DirectoryId>,
        slug: &str,
        exclude: Option<DirectoryId>,
    ) -> AppResult<bool>;

    /// Count the direct child directories of a directory.
    async fn count_children(&self, id: DirectoryId) -> AppResult<u64>;

    /// Insert a new directory.
    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory>;

    /// Persist every stored column of `directory`.
    async fn update(&self, directory: &Directory) -> AppResult<Directory>;

    /// Delete a directory. Returns `true` if a row was removed.
    async fn delete(&self, id: DirectoryId) -> AppResult<bool>;
}

/// Storage of file records.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file by ID.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// Find a file by its materialized path.
    async fn find_by_path(&self, path: &str) -> AppResult<Option<File>>;

    /// List the files owned by a directory.
    async fn list_by_directory(&self, directory_id: DirectoryId) -> AppResult<Vec<File>>;

    /// List every file.
    async fn list_all(&self) -> AppResult<Vec<File>>;

    /// Whether a file in `directory_id` already uses `slug`, ignoring `exclude`.
    async fn exists_by_directory_and_slug(
        &self,
        directory_id: DirectoryId,
        slug: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool>;

    /// Count the files owned by a directory.
    async fn count_by_directory(&self, directory_id: DirectoryId) -> AppResult<u64>;

    /// Insert a new file.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Persist every stored column of `file`.
    async fn update(&self, file: &File) -> AppResult<File>;

    /// Delete a file. Returns `true` if a row was removed.
    async fn delete(&self, id: FileId) -> AppResult<bool>;
}
