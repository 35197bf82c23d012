//! Cache key builders for every ArchiveHub cache entry.

/// Namespace shared by the hierarchy keys.
const PREFIX: &str = "hierarchy";

/// Cache key for the full tree, unpublished entries included.
pub fn tree_all() -> String {
    format!("{PREFIX}:tree:all")
}

/// Cache key for the tree restricted to published entries.
pub fn tree_published() -> String {
    format!("{PREFIX}:tree:published")
}

/// Cache key for the tree variant matching the visibility flag.
pub fn tree(include_unpublished: bool) -> String {
    if include_unpublished {
        tree_all()
    } else {
        tree_published()
    }
}

/// Both tree variants, dropped together on any hierarchy mutation.
pub fn tree_variants() -> [String; 2] {
    [tree_all(), tree_published()]
}
