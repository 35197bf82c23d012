//! Directory lifecycle operations.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use archivehub_core::error::{AppError, ErrorKind};
use archivehub_core::result::AppResult;
use archivehub_core::traits::cache::CacheProvider;
use archivehub_core::types::{DirectoryId, Patch};
use archivehub_database::store::{DirectoryStore, FileStore};
use archivehub_entity::directory::{Breadcrumb, CreateDirectory, Directory};

use super::tree::{TreeCache, assemble_tree, sort_directories};
use crate::path::{
    build_directory_path, build_file_path, is_same_or_nested, normalize_path, rebase_path,
};
use crate::slug::{DIRECTORY_FALLBACK, derive_slug, ensure_unique_slug, slug_from_name};

/// Request to create a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    /// Parent directory; `None` creates a root.
    #[serde(default)]
    pub parent_id: Option<DirectoryId>,
    /// Display name (required).
    pub name: String,
    /// Requested slug. Generated from the name when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Accepted but never stored.
    #[serde(default)]
    pub description: Option<String>,
    /// Sort key among siblings.
    #[serde(default)]
    pub order: i32,
    /// Visibility flag.
    #[serde(default)]
    pub published: bool,
}

/// Partial update of a directory. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDirectoryRequest {
    /// New parent; `null` moves the directory to the root.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub parent_id: Patch<DirectoryId>,
    /// New display name; `null` is rejected.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub name: Patch<String>,
    /// New slug; `null` regenerates it from the name.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub slug: Patch<String>,
    /// Accepted but never stored.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    /// New sort key; `null` resets it to 0.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub order: Patch<i32>,
    /// New visibility; `null` unpublishes.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub published: Patch<bool>,
}

/// Orchestrates directory lifecycle, path relocation and the cached tree.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    /// Directory store.
    directories: Arc<dyn DirectoryStore>,
    /// File store, for emptiness checks, tree assembly and realignment.
    files: Arc<dyn FileStore>,
    /// Cached tree variants.
    tree_cache: TreeCache,
}

impl DirectoryService {
    /// Creates a new directory service. Without a cache every tree read rebuilds.
    pub fn new(
        directories: Arc<dyn DirectoryStore>,
        files: Arc<dyn FileStore>,
        cache: Option<Arc<dyn CacheProvider>>,
        tree_ttl: Duration,
    ) -> Self {
        Self {
            directories,
            files,
            tree_cache: TreeCache::new(cache, tree_ttl),
        }
    }

    /// Creates a directory.
    pub async fn create(&self, req: CreateDirectoryRequest) -> AppResult<Directory> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Directory name cannot be empty"));
        }

        let parent = match req.parent_id {
            Some(parent_id) => Some(self.resolve_parent(parent_id).await?),
            None => None,
        };
        let parent_id = parent.as_ref().map(|p| p.id);

        let candidate = derive_slug(req.slug.as_deref(), name, DIRECTORY_FALLBACK);
        let slug = self.allocate_slug(&candidate, parent_id, None).await?;
        let path = build_directory_path(parent.as_ref(), &slug);

        if self.directories.find_by_path(&path).await?.is_some() {
            return Err(AppError::conflict(format!(
                "A directory at path '{path}' already exists"
            )));
        }

        let record = CreateDirectory {
            parent_id,
            name: name.to_string(),
            slug,
            path,
            description: String::new(),
            order: req.order,
            published: req.published,
        };
        let mut directory = self.directories.create(&record).await?;
        directory.strip_description();

        info!(
            directory_id = %directory.id,
            path = %directory.path,
            "Directory created"
        );

        self.invalidate_tree_cache().await;
        Ok(directory)
    }

    /// Applies a partial update, relocating descendants when the path changes.
    pub async fn update(
        &self,
        id: DirectoryId,
        req: UpdateDirectoryRequest,
    ) -> AppResult<Directory> {
        let mut directory = self
            .directories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;
        let old_path = directory.path.clone();
        let old_parent_id = directory.parent_id;

        match &req.name {
            Patch::Unset => {}
            Patch::Null => return Err(AppError::validation("Directory name cannot be empty")),
            Patch::Value(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::validation("Directory name cannot be empty"));
                }
                directory.name = name.to_string();
            }
        }

        let parent = match &req.parent_id {
            Patch::Unset => match directory.parent_id {
                Some(parent_id) => Some(self.resolve_parent(parent_id).await?),
                None => None,
            },
            Patch::Null => None,
            Patch::Value(parent_id) => {
                if *parent_id == id {
                    return Err(AppError::invalid_parent(
                        "A directory cannot be its own parent",
                    ));
                }
                let parent = self.resolve_parent(*parent_id).await?;
                if is_same_or_nested(&parent.path, &directory.path) {
                    return Err(AppError::invalid_parent(format!(
                        "Cannot move '{}' into its own subtree '{}'",
                        directory.path, parent.path
                    )));
                }
                Some(parent)
            }
        };
        let parent_id = parent.as_ref().map(|p| p.id);

        let requested_slug = match &req.slug {
            Patch::Unset => None,
            Patch::Null => Some(slug_from_name(&directory.name, DIRECTORY_FALLBACK)),
            Patch::Value(slug) => Some(derive_slug(
                Some(slug),
                &directory.name,
                DIRECTORY_FALLBACK,
            )),
        };
        let slug_changed = requested_slug
            .as_deref()
            .is_some_and(|s| !s.eq_ignore_ascii_case(&directory.slug));
        if slug_changed || parent_id != old_parent_id {
            let candidate = requested_slug.unwrap_or_else(|| directory.slug.clone());
            directory.slug = self.allocate_slug(&candidate, parent_id, Some(id)).await?;
        }

        match req.order {
            Patch::Unset => {}
            Patch::Null => directory.order = 0,
            Patch::Value(order) => directory.order = order,
        }
        match req.published {
            Patch::Unset => {}
            Patch::Null => directory.published = false,
            Patch::Value(published) => directory.published = published,
        }

        let path = build_directory_path(parent.as_ref(), &directory.slug);
        if path != old_path {
            let occupied = self
                .directories
                .find_by_path(&path)
                .await?
                .is_some_and(|other| other.id != id);
            if occupied {
                return Err(AppError::conflict(format!(
                    "A directory at path '{path}' already exists"
                )));
            }
        }

        directory.parent_id = parent_id;
        directory.path = path;
        directory.description.clear();

        let mut updated = self.directories.update(&directory).await?;

        if updated.path != old_path {
            let moved = self.relocate_descendants(&old_path, &updated.path).await?;
            self.realign_files(&updated).await?;
            info!(
                directory_id = %id,
                from = %old_path,
                to = %updated.path,
                descendants = moved,
                "Directory relocated"
            );
        }

        info!(directory_id = %id, path = %updated.path, "Directory updated");

        self.invalidate_tree_cache().await;
        updated.strip_description();
        Ok(updated)
    }

    /// Deletes an empty directory.
    pub async fn delete(&self, id: DirectoryId) -> AppResult<()> {
        let directory = self
            .directories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))?;

        if self.directories.count_children(id).await? > 0 {
            return Err(AppError::not_empty(format!(
                "Directory '{}' still has child directories",
                directory.path
            )));
        }
        if self.files.count_by_directory(id).await? > 0 {
            return Err(AppError::not_empty(format!(
                "Directory '{}' still has files",
                directory.path
            )));
        }

        if !self.directories.delete(id).await? {
            return Err(AppError::not_found(format!("Directory {id} not found")));
        }

        info!(directory_id = %id, path = %directory.path, "Directory deleted");

        self.invalidate_tree_cache().await;
        Ok(())
    }

    /// Gets a directory by ID.
    pub async fn get_by_id(
        &self,
        id: DirectoryId,
        include_unpublished: bool,
    ) -> AppResult<Directory> {
        let directory = self.directories.find_by_id(id).await?;
        visible(directory, include_unpublished, || format!("Directory {id} not found"))
    }

    /// Gets a directory by its materialized path.
    pub async fn get_by_path(&self, path: &str, include_unpublished: bool) -> AppResult<Directory> {
        let path = normalize_path(path);
        let directory = self.directories.find_by_path(&path).await?;
        visible(directory, include_unpublished, || {
            format!("Directory '{path}' not found")
        })
    }

    /// Lists the direct children of `parent_id`, or the roots when `None`.
    pub async fn list_by_parent(
        &self,
        parent_id: Option<DirectoryId>,
        include_unpublished: bool,
    ) -> AppResult<Vec<Directory>> {
        let mut directories: Vec<Directory> = self
            .directories
            .list_by_parent(parent_id)
            .await?
            .into_iter()
            .filter(|d| include_unpublished || d.published)
            .map(|mut d| {
                d.strip_description();
                d
            })
            .collect();
        sort_directories(&mut directories);
        Ok(directories)
    }

    /// Returns the nested tree, served from the cache when possible.
    pub async fn list_tree(&self, include_unpublished: bool) -> AppResult<Vec<Directory>> {
        if let Some(mut tree) = self.tree_cache.load(include_unpublished).await {
            debug!(include_unpublished, "Serving directory tree from cache");
            tree.iter_mut().for_each(Directory::strip_description);
            return Ok(tree);
        }

        let generation = self.tree_cache.generation();
        let tree = self.build_tree(include_unpublished).await?;
        self.tree_cache
            .store(include_unpublished, &tree, generation)
            .await;
        Ok(tree)
    }

    /// Resolves every segment of `path` from the root down to the leaf.
    pub async fn build_breadcrumbs(
        &self,
        path: &str,
        include_unpublished: bool,
    ) -> AppResult<Vec<Breadcrumb>> {
        let normalized = normalize_path(path);
        let mut crumbs = Vec::new();
        let mut cumulative = String::new();

        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            if !cumulative.is_empty() {
                cumulative.push('/');
            }
            cumulative.push_str(segment);

            let directory = self.get_by_path(&cumulative, include_unpublished).await?;
            crumbs.push(Breadcrumb {
                name: directory.name,
                path: directory.path,
            });
        }

        Ok(crumbs)
    }

    /// Rewrites every directory beneath `old_path` to live beneath `new_path`
    /// and realigns their files.
    ///
    /// Directories already moved no longer match the prefix, so re-running
    /// after an interrupted cascade finishes the move. Returns the number of
    /// directories rewritten.
    pub async fn relocate_descendants(&self, old_path: &str, new_path: &str) -> AppResult<u64> {
        let old_path = normalize_path(old_path);
        let new_path = normalize_path(new_path);
        if old_path == new_path || old_path.is_empty() {
            return Ok(0);
        }

        let prefix = format!("{old_path}/");
        let descendants = self.directories.list_by_path_prefix(&prefix).await?;

        let mut moved = 0;
        for mut descendant in descendants {
            let Some(path) = rebase_path(&descendant.path, &old_path, &new_path) else {
                continue;
            };
            descendant.path = path;
            let saved = self.directories.update(&descendant).await?;
            self.realign_files(&saved).await?;
            moved += 1;
        }

        if moved > 0 {
            debug!(from = %old_path, to = %new_path, moved, "Descendants relocated");
            self.invalidate_tree_cache().await;
        }
        Ok(moved)
    }

    /// Re-runs an interrupted relocation from `old_path` to `new_path`.
    ///
    /// A directory must exist at `new_path` (published or not) and none may
    /// remain at `old_path`; otherwise the cascade would detach descendants
    /// from their parent chain. Returns the number of directories relocated.
    pub async fn repair_relocation(&self, old_path: &str, new_path: &str) -> AppResult<u64> {
        let target = self.get_by_path(new_path, true).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                AppError::not_found(format!(
                    "Cannot repair into '{}': no directory at that path",
                    normalize_path(new_path)
                ))
            } else {
                e
            }
        })?;

        let old_path = normalize_path(old_path);
        let leftover = self.directories.find_by_path(&old_path).await?;
        if leftover.is_some_and(|existing| existing.id != target.id) {
            return Err(AppError::conflict(format!(
                "Directory '{old_path}' still exists; nothing to repair"
            )));
        }

        let moved = self.relocate_descendants(&old_path, &target.path).await?;
        let realigned = self.realign_files(&target).await?;
        if realigned > 0 {
            self.invalidate_tree_cache().await;
        }
        info!(from = %old_path, to = %target.path, moved, realigned, "Relocation repaired");
        Ok(moved)
    }

    /// Recomputes the path of every file in `directory`. Returns the number
    /// of files rewritten.
    pub async fn realign_files(&self, directory: &Directory) -> AppResult<u64> {
        let mut realigned = 0;
        for mut file in self.files.list_by_directory(directory.id).await? {
            let expected = build_file_path(&directory.path, &file.slug);
            if file.path != expected {
                file.path = expected;
                self.files.update(&file).await?;
                realigned += 1;
            }
        }
        Ok(realigned)
    }

    /// Drops both cached tree variants.
    pub async fn invalidate_tree_cache(&self) {
        self.tree_cache.invalidate().await;
    }

    async fn build_tree(&self, include_unpublished: bool) -> AppResult<Vec<Directory>> {
        let directories: Vec<Directory> = self
            .directories
            .list_all()
            .await?
            .into_iter()
            .filter(|d| include_unpublished || d.published)
            .map(|mut d| {
                d.description.clear();
                d
            })
            .collect();
        let files = self
            .files
            .list_all()
            .await?
            .into_iter()
            .filter(|f| include_unpublished || f.published)
            .collect();

        Ok(assemble_tree(directories, files))
    }

    async fn resolve_parent(&self, parent_id: DirectoryId) -> AppResult<Directory> {
        self.directories
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| {
                AppError::invalid_parent(format!("Parent directory {parent_id} not found"))
            })
    }

    async fn allocate_slug(
        &self,
        candidate: &str,
        parent_id: Option<DirectoryId>,
        exclude: Option<DirectoryId>,
    ) -> AppResult<String> {
        let store = Arc::clone(&self.directories);
        ensure_unique_slug(candidate, DIRECTORY_FALLBACK, move |slug| {
            let store = Arc::clone(&store);
            async move {
                store
                    .exists_by_parent_and_slug(parent_id, &slug, exclude)
                    .await
            }
        })
        .await
    }
}

/// Apply the visibility filter to a lookup result and strip the description.
fn visible(
    directory: Option<Directory>,
    include_unpublished: bool,
    not_found: impl FnOnce() -> String,
) -> AppResult<Directory> {
    match directory {
        Some(mut directory) if include_unpublished || directory.published => {
            directory.strip_description();
            Ok(directory)
        }
        _ => Err(AppError::not_found(not_found())),
    }
}
