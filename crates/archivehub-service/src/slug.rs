//! Slug generation and collision resolution.

use std::future::Future;

use chrono::Utc;

use archivehub_core::result::AppResult;

/// Fallback slug for directories whose candidate is empty.
pub const DIRECTORY_FALLBACK: &str = "directory";

/// Fallback slug for files whose candidate is empty.
pub const FILE_FALLBACK: &str = "file";

/// Turn a display name into a URL-safe token.
///
/// ASCII letters and digits are kept (lower-cased); every run of other
/// characters becomes a single `-`, and leading/trailing dashes are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug derived from `name`, or a time-seeded `<kind>-<millis>` token when
/// the name has no usable characters.
pub fn slug_from_name(name: &str, kind: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        format!("{kind}-{}", Utc::now().timestamp_millis())
    } else {
        slug
    }
}

/// Slug candidate from a caller-requested slug, else from `name`.
///
/// The requested slug is normalized with [`slugify`]; when that leaves
/// nothing usable the name is used instead.
pub fn derive_slug(requested: Option<&str>, name: &str, kind: &str) -> String {
    match requested.map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => slug,
        None => slug_from_name(name, kind),
    }
}

/// Find the first free slug in a scope.
///
/// `candidate` is lower-cased (or replaced by `fallback` when empty) and
/// probed with `is_taken`; on collision `-1`, `-2`, … are appended until a
/// probe reports the slug free. Probe errors abort the allocation.
pub async fn ensure_unique_slug<F, Fut>(
    candidate: &str,
    fallback: &str,
    mut is_taken: F,
) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let mut base = candidate.trim().to_lowercase();
    if base.is_empty() {
        base = fallback.to_string();
    }

    if !is_taken(base.clone()).await? {
        return Ok(base);
    }

    let mut suffix: u64 = 1;
    loop {
        let attempt = format!("{base}-{suffix}");
        if !is_taken(attempt.clone()).await? {
            return Ok(attempt);
        }
        suffix += 1;
    }
}
