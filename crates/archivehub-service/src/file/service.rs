//! File lifecycle operations with remote metadata inference.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::types::{DirectoryId, FileId, Patch};
use archivehub_database::store::{DirectoryStore, FileStore};
use archivehub_entity::directory::Directory;
use archivehub_entity::file::{CreateFile, File, FileType};

use crate::directory::DirectoryService;
use crate::directory::tree::sort_files;
use crate::metadata::{MetadataProbe, classify_file_type};
use crate::path::{build_file_path, normalize_path};
use crate::slug::{FILE_FALLBACK, derive_slug, ensure_unique_slug, slug_from_name};

/// Request to create a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFileRequest {
    /// Owning directory.
    pub directory_id: DirectoryId,
    /// Display name (required).
    pub name: String,
    /// Requested slug. Generated from the name when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Location of the remote resource (required).
    pub file_url: String,
    /// Optional preview location.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Declared MIME type. Inferred when absent.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Declared category. Classified when absent or `other`.
    #[serde(default)]
    pub file_type: Option<FileType>,
    /// Declared size in bytes. Inferred when absent.
    #[serde(default)]
    pub file_size: Option<i64>,
    /// Sort key.
    #[serde(default)]
    pub order: i32,
    /// Visibility flag.
    #[serde(default)]
    pub published: bool,
}

/// Partial update of a file. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    /// Move to another directory; `null` is rejected.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub directory_id: Patch<DirectoryId>,
    /// New display name; `null` is rejected.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub name: Patch<String>,
    /// New slug; `null` regenerates it from the name.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub slug: Patch<String>,
    /// New description; `null` clears it.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    /// New remote location; `null` is rejected.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub file_url: Patch<String>,
    /// New preview location; `null` clears it.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub preview_url: Patch<String>,
    /// New MIME type; `null` clears it and allows re-inference.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub mime_type: Patch<String>,
    /// New category; `null` reclassifies.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub file_type: Patch<FileType>,
    /// New size; `null` clears it and allows re-inference.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub file_size: Patch<i64>,
    /// New sort key; `null` resets it to 0.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub order: Patch<i32>,
    /// New visibility; `null` unpublishes.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub published: Patch<bool>,
}

/// Metadata after declared values, classification and inference are merged.
#[derive(Debug)]
struct ResolvedMetadata {
    mime_type: Option<String>,
    file_size: Option<i64>,
    file_type: FileType,
}

/// Orchestrates file lifecycle and metadata inference.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Directory store (owning directory lookups).
    directories: Arc<dyn DirectoryStore>,
    /// Directory service, owner of the tree cache.
    directory_service: Arc<DirectoryService>,
    /// Remote metadata source.
    probe: Arc<dyn MetadataProbe>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        directories: Arc<dyn DirectoryStore>,
        directory_service: Arc<DirectoryService>,
        probe: Arc<dyn MetadataProbe>,
    ) -> Self {
        Self {
            files,
            directories,
            directory_service,
            probe,
        }
    }

    /// Creates a file in an existing directory.
    pub async fn create(&self, req: CreateFileRequest) -> AppResult<File> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        let file_url = req.file_url.trim();
        if file_url.is_empty() {
            return Err(AppError::validation("File URL cannot be empty"));
        }

        let directory = self.resolve_directory(req.directory_id).await?;

        let candidate = derive_slug(req.slug.as_deref(), name, FILE_FALLBACK);
        let slug = self.allocate_slug(&candidate, directory.id, None).await?;
        let path = build_file_path(&directory.path, &slug);

        let metadata = self
            .resolve_metadata(
                file_url,
                non_blank(req.mime_type),
                req.file_size,
                req.file_type,
            )
            .await;

        let record = CreateFile {
            directory_id: directory.id,
            name: name.to_string(),
            slug,
            path,
            description: req.description,
            file_url: file_url.to_string(),
            preview_url: non_blank(req.preview_url),
            mime_type: metadata.mime_type,
            file_type: metadata.file_type,
            file_size: metadata.file_size,
            published: req.published,
            order: req.order,
        };
        let file = self.files.create(&record).await?;

        info!(
            file_id = %file.id,
            path = %file.path,
            file_type = %file.file_type,
            "File created"
        );

        self.directory_service.invalidate_tree_cache().await;
        Ok(file)
    }

    /// Applies a partial update.
    ///
    /// A new URL drops the MIME type, size and type learned for the old one
    /// unless the same request supplies replacements.
    pub async fn update(&self, id: FileId, req: UpdateFileRequest) -> AppResult<File> {
        let mut file = self
            .files
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        match req.name {
            Patch::Unset => {}
            Patch::Null => return Err(AppError::validation("File name cannot be empty")),
            Patch::Value(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("File name cannot be empty"));
                }
                file.name = name.to_string();
            }
        }

        let mut url_changed = false;
        match req.file_url {
            Patch::Unset => {}
            Patch::Null => return Err(AppError::validation("File URL cannot be empty")),
            Patch::Value(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(AppError::validation("File URL cannot be empty"));
                }
                url_changed = url != file.file_url;
                file.file_url = url.to_string();
            }
        }

        let target_directory_id = match req.directory_id {
            Patch::Unset => file.directory_id,
            Patch::Null => {
                return Err(AppError::validation("A file must belong to a directory"));
            }
            Patch::Value(directory_id) => directory_id,
        };

        let requested_slug = match &req.slug {
            Patch::Unset => None,
            Patch::Null => Some(slug_from_name(&file.name, FILE_FALLBACK)),
            Patch::Value(slug) => Some(derive_slug(Some(slug), &file.name, FILE_FALLBACK)),
        };
        let slug_changed = requested_slug
            .as_deref()
            .is_some_and(|s| !s.eq_ignore_ascii_case(&file.slug));
        let directory_changed = target_directory_id != file.directory_id;

        let directory = self.resolve_directory(target_directory_id).await?;
        if directory_changed || slug_changed {
            let candidate = requested_slug.unwrap_or_else(|| file.slug.clone());
            file.slug = self.allocate_slug(&candidate, directory.id, Some(id)).await?;
        }
        file.directory_id = directory.id;
        file.path = build_file_path(&directory.path, &file.slug);

        let mime_supplied = req.mime_type.is_set();
        let mime_type = match req.mime_type {
            Patch::Unset if url_changed => None,
            Patch::Unset => file.mime_type.take(),
            Patch::Null => None,
            Patch::Value(mime) => non_blank(Some(mime)),
        };
        let file_size = match req.file_size {
            Patch::Unset if url_changed => None,
            Patch::Unset => file.file_size,
            Patch::Null => None,
            Patch::Value(size) => Some(size),
        };
        let declared_type = match req.file_type {
            Patch::Unset if url_changed || mime_supplied => None,
            Patch::Unset => Some(file.file_type),
            Patch::Null => None,
            Patch::Value(file_type) => Some(file_type),
        };
        let metadata = self
            .resolve_metadata(&file.file_url, mime_type, file_size, declared_type)
            .await;
        file.mime_type = metadata.mime_type;
        file.file_size = metadata.file_size;
        file.file_type = metadata.file_type;

        match req.preview_url {
            Patch::Unset => {}
            Patch::Null => file.preview_url = None,
            Patch::Value(url) => file.preview_url = non_blank(Some(url)),
        }
        match req.description {
            Patch::Unset => {}
            Patch::Null => file.description.clear(),
            Patch::Value(description) => file.description = description,
        }
        match req.order {
            Patch::Unset => {}
            Patch::Null => file.order = 0,
            Patch::Value(order) => file.order = order,
        }
        match req.published {
            Patch::Unset => {}
            Patch::Null => file.published = false,
            Patch::Value(published) => file.published = published,
        }

        let updated = self.files.update(&file).await?;

        info!(file_id = %id, path = %updated.path, "File updated");

        self.directory_service.invalidate_tree_cache().await;
        Ok(updated)
    }

    /// Deletes a file.
    pub async fn delete(&self, id: FileId) -> AppResult<()> {
        let file = self
            .files
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        if !self.files.delete(id).await? {
            return Err(AppError::not_found(format!("File {id} not found")));
        }

        info!(file_id = %id, path = %file.path, "File deleted");

        self.directory_service.invalidate_tree_cache().await;
        Ok(())
    }

    /// Gets a file by ID.
    pub async fn get_by_id(&self, id: FileId, include_unpublished: bool) -> AppResult<File> {
        let file = self.files.find_by_id(id).await?;
        visible(file, include_unpublished, || format!("File {id} not found"))
    }

    /// Gets a file by its materialized path.
    pub async fn get_by_path(&self, path: &str, include_unpublished: bool) -> AppResult<File> {
        let path = normalize_path(path);
        let file = self.files.find_by_path(&path).await?;
        visible(file, include_unpublished, || format!("File '{path}' not found"))
    }

    /// Lists the files of a directory.
    pub async fn list_by_directory(
        &self,
        directory_id: DirectoryId,
        include_unpublished: bool,
    ) -> AppResult<Vec<File>> {
        let mut files: Vec<File> = self
            .files
            .list_by_directory(directory_id)
            .await?
            .into_iter()
            .filter(|f| include_unpublished || f.published)
            .collect();
        sort_files(&mut files);
        Ok(files)
    }

    /// Lists the files of the directory at `path`, which must itself be visible.
    pub async fn list_by_directory_path(
        &self,
        path: &str,
        include_unpublished: bool,
    ) -> AppResult<Vec<File>> {
        let directory = self
            .directory_service
            .get_by_path(path, include_unpublished)
            .await?;
        self.list_by_directory(directory.id, include_unpublished)
            .await
    }

    async fn resolve_directory(&self, directory_id: DirectoryId) -> AppResult<Directory> {
        self.directories
            .find_by_id(directory_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {directory_id} not found")))
    }

    async fn allocate_slug(
        &self,
        candidate: &str,
        directory_id: DirectoryId,
        exclude: Option<FileId>,
    ) -> AppResult<String> {
        let store = Arc::clone(&self.files);
        ensure_unique_slug(candidate, FILE_FALLBACK, move |slug| {
            let store = Arc::clone(&store);
            async move {
                store
                    .exists_by_directory_and_slug(directory_id, &slug, exclude)
                    .await
            }
        })
        .await
    }

    /// Merge declared metadata with classification and, when the MIME type or
    /// size is still unknown, a remote probe. Probe failures are logged and
    /// leave the declared values in place.
    async fn resolve_metadata(
        &self,
        url: &str,
        mut mime_type: Option<String>,
        mut file_size: Option<i64>,
        declared_type: Option<FileType>,
    ) -> ResolvedMetadata {
        let declared_type = declared_type.filter(|t| !t.is_other());
        let mut file_type =
            declared_type.unwrap_or_else(|| classify_file_type(mime_type.as_deref(), url));

        if mime_type.is_none() || file_size.is_none() {
            match self.probe.probe(url).await {
                Ok(remote) => {
                    if mime_type.is_none() {
                        mime_type = remote.mime_type;
                    }
                    if file_size.is_none() {
                        file_size = remote.size;
                    }
                    if declared_type.is_none() {
                        let inferred = classify_file_type(mime_type.as_deref(), url);
                        if !inferred.is_other() {
                            file_type = inferred;
                        }
                    }
                }
                Err(e) => {
                    warn!(url, error = %e, "Remote metadata inference failed");
                }
            }
        }

        ResolvedMetadata {
            mime_type,
            file_size,
            file_type,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn visible(
    file: Option<File>,
    include_unpublished: bool,
    not_found: impl FnOnce() -> String,
) -> AppResult<File> {
    match file {
        Some(file) if include_unpublished || file.published => Ok(file),
        _ => Err(AppError::not_found(not_found())),
    }
}
