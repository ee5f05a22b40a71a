//! URL handling module for Health-Harvest
//!
//! Seed and href resolution, the key used for the per-run visited set, and
//! the file name sanitization used for HTML snapshots.

mod filename;
mod resolve;

pub use filename::{sanitize_filename, MAX_FILENAME_CHARS};
pub use resolve::{parse_base_url, resolve_href, resolve_seed, visit_key};

use ::url::Url;

/// Derives the snapshot file stem for a fetched page
///
/// Uses the sanitized URL path; when that is empty (e.g. the site root) the
/// sanitized source name is used instead.
pub fn snapshot_stem(url: &Url, source_name: &str) -> String {
    let from_path = sanitize_filename(url.path());
    if !from_path.is_empty() {
        return from_path;
    }

    let from_source = sanitize_filename(source_name);
    if from_source.is_empty() {
        "index".to_string()
    } else {
        from_source
    }
}
