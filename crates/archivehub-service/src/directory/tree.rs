//! Nested tree assembly and the shared tree cache.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use tracing::{debug, warn};

use archivehub_cache::keys;
use archivehub_core::traits::cache::CacheProvider;
use archivehub_core::types::DirectoryId;
use archivehub_entity::directory::Directory;
use archivehub_entity::file::File;

/// Sort directories by `(order, lower-cased name)`, ties broken by id.
pub fn sort_directories(directories: &mut [Directory]) {
    directories.sort_by(|a, b| {
        compare_entries((a.order, &a.name), (b.order, &b.name)).then(a.id.cmp(&b.id))
    });
}

/// Sort files by `(order, lower-cased name)`, ties broken by id.
pub fn sort_files(files: &mut [File]) {
    files.sort_by(|a, b| {
        compare_entries((a.order, &a.name), (b.order, &b.name)).then(a.id.cmp(&b.id))
    });
}

fn compare_entries(a: (i32, &str), b: (i32, &str)) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
}

/// Build the nested tree from flat directory and file lists.
///
/// Rows are loaded once and indexed by id; children are bucketed by parent
/// and files by directory, then the forest is materialized depth first from
/// the parentless roots. A directory whose parent is absent from `directories`
/// is not attached anywhere, and neither is a file whose directory is absent.
pub fn assemble_tree(directories: Vec<Directory>, files: Vec<File>) -> Vec<Directory> {
    let mut slots: Vec<Option<Directory>> = Vec::with_capacity(directories.len());
    let mut children: HashMap<DirectoryId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (idx, mut directory) in directories.into_iter().enumerate() {
        directory.children.clear();
        directory.files.clear();
        match directory.parent_id {
            Some(parent_id) => children.entry(parent_id).or_default().push(idx),
            None => roots.push(idx),
        }
        slots.push(Some(directory));
    }

    let mut files_by_directory: HashMap<DirectoryId, Vec<File>> = HashMap::new();
    for file in files {
        files_by_directory
            .entry(file.directory_id)
            .or_default()
            .push(file);
    }

    let mut forest: Vec<Directory> = roots
        .into_iter()
        .filter_map(|idx| materialize(idx, &mut slots, &children, &mut files_by_directory))
        .collect();
    sort_directories(&mut forest);
    forest
}

fn materialize(
    idx: usize,
    slots: &mut [Option<Directory>],
    children: &HashMap<DirectoryId, Vec<usize>>,
    files: &mut HashMap<DirectoryId, Vec<File>>,
) -> Option<Directory> {
    // Taking the slot means a node is attached at most once.
    let mut directory = slots.get_mut(idx)?.take()?;

    if let Some(child_ids) = children.get(&directory.id) {
        directory.children = child_ids
            .iter()
            .filter_map(|&child| materialize(child, slots, children, files))
            .collect();
        sort_directories(&mut directory.children);
    }

    if let Some(mut owned) = files.remove(&directory.id) {
        sort_files(&mut owned);
        directory.files = owned;
    }

    Some(directory)
}

/// Cached copies of the two tree variants.
///
/// Every failure of the cache backend is logged and treated as a miss, so a
/// broken or absent cache only costs a rebuild.
///
/// Invalidations bump a generation counter. A rebuilt tree is only kept if
/// no invalidation happened between [`TreeCache::generation`] being read
/// before the rebuild and the write completing.
#[derive(Debug, Clone)]
pub struct TreeCache {
    cache: Option<Arc<dyn CacheProvider>>,
    ttl: Duration,
    generation: Arc<AtomicU64>,
}

impl TreeCache {
    /// Wrap an optional cache provider.
    pub fn new(cache: Option<Arc<dyn CacheProvider>>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current invalidation generation; read it before rebuilding a tree.
    pub fn generation(&self) -> u64 {
        self.generation.load(AtomicOrdering::SeqCst)
    }

    /// Whether a cache backend is configured.
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Read the cached tree variant, if present and decodable.
    pub async fn load(&self, include_unpublished: bool) -> Option<Vec<Directory>> {
        let cache = self.cache.as_ref()?;
        let key = keys::tree(include_unpublished);

        let raw = match cache.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Tree cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Tree cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cached tree");
                None
            }
        }
    }

    /// Store a tree variant built at `generation` with the configured TTL.
    ///
    /// Skipped when the tree has been invalidated since `generation` was read.
    pub async fn store(&self, include_unpublished: bool, tree: &[Directory], generation: u64) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let key = keys::tree(include_unpublished);
        if self.generation() != generation {
            debug!(key = %key, "Tree invalidated during rebuild; not caching");
            return;
        }

        let raw = match serde_json::to_string(tree) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode tree for cache");
                return;
            }
        };
        if let Err(e) = cache.set(&key, &raw, self.ttl).await {
            warn!(key = %key, error = %e, "Tree cache write failed");
            return;
        }

        // An invalidation that raced the write may have deleted before it landed.
        if self.generation() != generation {
            debug!(key = %key, "Tree invalidated while caching; dropping entry");
            if let Err(e) = cache.delete(&key).await {
                warn!(key = %key, error = %e, "Tree cache invalidation failed");
            }
        }
    }

    /// Drop both tree variants.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, AtomicOrdering::SeqCst);
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        for key in keys::tree_variants() {
            if let Err(e) = cache.delete(&key).await {
                warn!(key = %key, error = %e, "Tree cache invalidation failed");
            }
        }
    }
}
