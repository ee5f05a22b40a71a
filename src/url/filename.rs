use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length of a sanitized file name, in characters
pub const MAX_FILENAME_CHARS: usize = 200;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SEPARATOR_RUNS: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Creates a safe file name from arbitrary text
///
/// Drops everything except word characters, whitespace and hyphens, turns
/// each run of hyphens/whitespace into a single underscore, and truncates to
/// [`MAX_FILENAME_CHARS`].
///
/// # Examples
///
/// ```
/// use health_harvest::url::sanitize_filename;
///
/// assert_eq!(
///     sanitize_filename("/index.php/resources/publications"),
///     "indexphpresourcespublications"
/// );
/// assert_eq!(sanitize_filename("what-we-do / health"), "what_we_do_health");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(text, "");
    let joined = SEPARATOR_RUNS.replace_all(&cleaned, "_");
    joined.chars().take(MAX_FILENAME_CHARS).collect()
}
