use crate::UrlError;
use url::Url;

/// Parses a source base URL, accepting only HTTP and HTTPS
pub fn parse_base_url(base_url: &str) -> Result<Url, UrlError> {
    let url = Url::parse(base_url).map_err(|e| UrlError::Parse(format!("{}: {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Resolves a configured seed path against a source's base URL
///
/// Standard reference resolution applies: a path starting with `/` replaces
/// the whole base path.
///
/// # Examples
///
/// ```
/// use health_harvest::url::{parse_base_url, resolve_seed};
///
/// let base = parse_base_url("https://ncdc.gov.ng").unwrap();
/// let url = resolve_seed(&base, "/reports").unwrap();
/// assert_eq!(url.as_str(), "https://ncdc.gov.ng/reports");
/// ```
pub fn resolve_seed(base: &Url, path: &str) -> Result<Url, UrlError> {
    base.join(path.trim())
        .map_err(|e| UrlError::Parse(format!("{} against {}: {}", path, base, e)))
}

/// Resolves an href found on a page to an absolute URL
///
/// Returns None for empty hrefs and hrefs that cannot be joined. Non-HTTP
/// schemes are kept: a `mailto:` href still yields a URL.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok()
}

/// Key used for the visited set
///
/// Two URLs that differ only in their fragment address the same document.
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}
