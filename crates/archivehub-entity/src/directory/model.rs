//! Directory entity model.

use archivehub_core::types::DirectoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::file::File;

/// A directory in the archive hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Directory {
    /// Unique directory identifier.
    pub id: DirectoryId,
    /// Parent directory ID (null for root directories).
    pub parent_id: Option<DirectoryId>,
    /// Display name.
    pub name: String,
    /// URL-safe token, unique among siblings.
    pub slug: String,
    /// Full lower-cased materialized path (e.g. `docs/2024`).
    pub path: String,
    /// Stored description. Service reads always return it empty.
    #[serde(default)]
    pub description: String,
    /// Sort key among siblings.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    /// Whether the directory is publicly visible.
    pub published: bool,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
    /// When the directory was last updated.
    pub updated_at: DateTime<Utc>,
    /// Child directories, populated only during tree assembly.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Directory>,
    /// Files in this directory, populated only during tree assembly.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

impl Directory {
    /// Check if this is a root directory (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Clear the description on this directory and every nested child.
    pub fn strip_description(&mut self) {
        self.description.clear();
        for child in &mut self.children {
            child.strip_description();
        }
    }

    /// Number of directories in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Directory::subtree_len).sum::<usize>()
    }
}

/// Data required to create a new directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectory {
    /// Parent directory (None for root).
    pub parent_id: Option<DirectoryId>,
    /// Display name.
    pub name: String,
    /// Allocated slug.
    pub slug: String,
    /// Computed materialized path.
    pub path: String,
    /// Description to store.
    pub description: String,
    /// Sort key.
    pub order: i32,
    /// Visibility flag.
    pub published: bool,
}
