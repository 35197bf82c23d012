//! File entity model.

use archivehub_core::types::{DirectoryId, FileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::FileType;

/// A remote file referenced from the archive hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The directory that owns this file.
    pub directory_id: DirectoryId,
    /// Display name.
    pub name: String,
    /// URL-safe token, unique within the directory.
    pub slug: String,
    /// `<directory path>/<slug>`, lower-cased.
    pub path: String,
    /// Free-form description.
    pub description: String,
    /// Location of the remote resource.
    pub file_url: String,
    /// Optional preview image or page.
    pub preview_url: Option<String>,
    /// MIME type, declared or inferred.
    pub mime_type: Option<String>,
    /// Coarse category; never empty.
    pub file_type: FileType,
    /// Size in bytes, declared or inferred.
    pub file_size: Option<i64>,
    /// Whether the file is publicly visible.
    pub published: bool,
    /// Sort key among files of the same directory.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Owning directory.
    pub directory_id: DirectoryId,
    /// Display name.
    pub name: String,
    /// Allocated slug.
    pub slug: String,
    /// Computed path.
    pub path: String,
    /// Description.
    pub description: String,
    /// Remote file URL.
    pub file_url: String,
    /// Optional preview URL.
    pub preview_url: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Resolved file type.
    pub file_type: FileType,
    /// Size in bytes.
    pub file_size: Option<i64>,
    /// Visibility flag.
    pub published: bool,
    /// Sort key.
    pub order: i32,
}
