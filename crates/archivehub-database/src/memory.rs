//! In-memory directory and file stores.
//!
//! Used by the service test-suites and by tooling that runs without a
//! database. They enforce the same uniqueness constraints as the SQL schema
//! (sibling slug, directory path, file slug per directory) so conflicts
//! surface the same way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::types::{DirectoryId, FileId};
use archivehub_entity::directory::{CreateDirectory, Directory};
use archivehub_entity::file::{CreateFile, File};

use crate::store::{DirectoryStore, FileStore};

/// In-memory [`DirectoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    rows: Arc<RwLock<HashMap<DirectoryId, Directory>>>,
}

impl MemoryDirectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_order_and_name<T>(items: &mut [T], key: impl Fn(&T) -> (i32, String)) {
    items.sort_by_key(|item| key(item));
}

fn check_directory_unique(
    rows: &HashMap<DirectoryId, Directory>,
    id: Option<DirectoryId>,
    parent_id: Option<DirectoryId>,
    slug: &str,
    path: &str,
) -> AppResult<()> {
    let clash = rows.values().filter(|d| Some(d.id) != id).find(|d| {
        (d.parent_id == parent_id && d.slug.eq_ignore_ascii_case(slug))
            || d.path.eq_ignore_ascii_case(path)
    });
    match clash {
        Some(_) => Err(AppError::conflict(format!("'{path}' already exists"))),
        None => Ok(()),
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_by_id(&self, id: DirectoryId) -> AppResult<Option<Directory>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|d| d.path.eq_ignore_ascii_case(path))
            .cloned())
    }

    async fn list_by_parent(&self, parent_id: Option<DirectoryId>) -> AppResult<Vec<Directory>> {
        let rows = self.rows.read().await;
        let mut children: Vec<Directory> = rows
            .values()
            .filter(|d| d.parent_id == parent_id)
            .cloned()
            .collect();
        sort_by_order_and_name(&mut children, |d| (d.order, d.name.to_lowercase()));
        Ok(children)
    }

    async fn list_all(&self) -> AppResult<Vec<Directory>> {
        let mut all: Vec<Directory> = self.rows.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(all)
    }

    async fn list_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Directory>> {
        let prefix = prefix.to_lowercase();
        let mut matched: Vec<Directory> = self
            .rows
            .read()
            .await
            .values()
            .filter(|d| d.path.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matched)
    }

    async fn exists_by_parent_and_slug(
        &self,
        parent_id: Option<DirectoryId>,
        slug: &str,
        exclude: Option<DirectoryId>,
    ) -> AppResult<bool> {
        let rows = self.rows.read().await;
        Ok(rows.values().any(|d| {
            d.parent_id == parent_id && d.slug.eq_ignore_ascii_case(slug) && Some(d.id) != exclude
        }))
    }

    async fn count_children(&self, id: DirectoryId) -> AppResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|d| d.parent_id == Some(id)).count() as u64)
    }

    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        let mut rows = self.rows.write().await;
        check_directory_unique(&rows, None, data.parent_id, &data.slug, &data.path)?;

        let now = Utc::now();
        let directory = Directory {
            id: DirectoryId::new(),
            parent_id: data.parent_id,
            name: data.name.clone(),
            slug: data.slug.clone(),
            path: data.path.clone(),
            description: data.description.clone(),
            order: data.order,
            published: data.published,
            created_at: now,
            updated_at: now,
            children: Vec::new(),
            files: Vec::new(),
        };
        rows.insert(directory.id, directory.clone());
        Ok(directory)
    }

    async fn update(&self, directory: &Directory) -> AppResult<Directory> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&directory.id) {
            return Err(AppError::not_found(format!(
                "Directory {} not found",
                directory.id
            )));
        }
        check_directory_unique(
            &rows,
            Some(directory.id),
            directory.parent_id,
            &directory.slug,
            &directory.path,
        )?;

        let mut stored = directory.clone();
        stored.children.clear();
        stored.files.clear();
        stored.updated_at = Utc::now();
        rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: DirectoryId) -> AppResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// In-memory [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    rows: Arc<RwLock<HashMap<FileId, File>>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_file_unique(
    rows: &HashMap<FileId, File>,
    id: Option<FileId>,
    directory_id: DirectoryId,
    slug: &str,
) -> AppResult<()> {
    let clash = rows.values().any(|f| {
        Some(f.id) != id && f.directory_id == directory_id && f.slug.eq_ignore_ascii_case(slug)
    });
    if clash {
        return Err(AppError::conflict(format!(
            "File slug '{slug}' already exists in directory {directory_id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<File>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|f| f.path.eq_ignore_ascii_case(path))
            .cloned())
    }

    async fn list_by_directory(&self, directory_id: DirectoryId) -> AppResult<Vec<File>> {
        let rows = self.rows.read().await;
        let mut files: Vec<File> = rows
            .values()
            .filter(|f| f.directory_id == directory_id)
            .cloned()
            .collect();
        sort_by_order_and_name(&mut files, |f| (f.order, f.name.to_lowercase()));
        Ok(files)
    }

    async fn list_all(&self) -> AppResult<Vec<File>> {
        let mut all: Vec<File> = self.rows.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(all)
    }

    async fn exists_by_directory_and_slug(
        &self,
        directory_id: DirectoryId,
        slug: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        let rows = self.rows.read().await;
        Ok(rows.values().any(|f| {
            f.directory_id == directory_id
                && f.slug.eq_ignore_ascii_case(slug)
                && Some(f.id) != exclude
        }))
    }

    async fn count_by_directory(&self, directory_id: DirectoryId) -> AppResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|f| f.directory_id == directory_id)
            .count() as u64)
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut rows = self.rows.write().await;
        check_file_unique(&rows, None, data.directory_id, &data.slug)?;

        let now = Utc::now();
        let file = File {
            id: FileId::new(),
            directory_id: data.directory_id,
            name: data.name.clone(),
            slug: data.slug.clone(),
            path: data.path.clone(),
            description: data.description.clone(),
            file_url: data.file_url.clone(),
            preview_url: data.preview_url.clone(),
            mime_type: data.mime_type.clone(),
            file_type: data.file_type,
            file_size: data.file_size,
            published: data.published,
            order: data.order,
            created_at: now,
            updated_at: now,
        };
        rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&file.id) {
            return Err(AppError::not_found(format!("File {} not found", file.id)));
        }
        check_file_unique(&rows, Some(file.id), file.directory_id, &file.slug)?;

        let mut stored = file.clone();
        stored.updated_at = Utc::now();
        rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
