//! Materialized path helpers.
//!
//! Paths are lower-cased slugs joined by `/`, without leading or trailing
//! slashes. Every comparison here is case-insensitive.

use archivehub_entity::directory::Directory;

/// Path of a directory with the given slug under `parent`.
pub fn build_directory_path(parent: Option<&Directory>, slug: &str) -> String {
    match parent {
        Some(parent) if !parent.path.is_empty() => {
            format!("{}/{}", parent.path, slug).to_lowercase()
        }
        _ => slug.to_lowercase(),
    }
}

/// Path of a file with the given slug inside the directory at `directory_path`.
pub fn build_file_path(directory_path: &str, slug: &str) -> String {
    let directory_path = directory_path.trim_matches('/').to_lowercase();
    let slug = slug.to_lowercase();
    if directory_path.is_empty() {
        slug
    } else {
        format!("{directory_path}/{slug}")
    }
}

/// Trim surrounding slashes and lower-case a caller-supplied path.
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_lowercase()
}

/// `true` when `path` equals `ancestor` or lies somewhere beneath it.
pub fn is_same_or_nested(path: &str, ancestor: &str) -> bool {
    let path = normalize_path(path);
    let ancestor = normalize_path(ancestor);
    path == ancestor || path.starts_with(&format!("{ancestor}/"))
}

/// Replace the `old_base/` prefix of `path` with `new_base/`.
///
/// Returns `None` when `path` is not strictly beneath `old_base`.
pub fn rebase_path(path: &str, old_base: &str, new_base: &str) -> Option<String> {
    let lowered = path.to_lowercase();
    let old_prefix = format!("{}/", normalize_path(old_base));
    let rest = lowered.strip_prefix(&old_prefix)?;
    Some(build_file_path(new_base, rest))
}
