//! Filesystem names derived from URLs
//!
//! Downloads, archived pages and the per-crawl output directory are all keyed
//! by parts of a URL. These helpers turn those parts into names that are safe
//! to use as a single path component.

use url::Url;

/// Fallback directory name when a seed URL yields nothing usable
const DEFAULT_DIR_NAME: &str = "downloads";

/// Name used for archived pages whose path is just `/`
const INDEX_PAGE_NAME: &str = "index";

/// Builds the per-crawl directory name from a seed URL
///
/// The host (with any explicit port) and path are joined, and `/`, `:` and `?`
/// are replaced with underscores. Leading and trailing underscores are trimmed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::output_dir_name;
///
/// let url = Url::parse("https://example.com/gallery/cats/").unwrap();
/// assert_eq!(output_dir_name(&url), "example.com_gallery_cats");
/// ```
pub fn output_dir_name(url: &Url) -> String {
    let mut raw = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        raw.push(':');
        raw.push_str(&port.to_string());
    }
    raw.push_str(url.path());

    let cleaned: String = raw
        .chars()
        .map(|c| if matches!(c, '/' | ':' | '?') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('_');

    if cleaned.is_empty() {
        DEFAULT_DIR_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Returns the final path segment of a URL, if it names something
///
/// `https://example.com/img/cat.gif` yields `cat.gif`; a URL ending in `/`
/// yields `None`. Dot segments are never returned so a name cannot escape the
/// directory it is joined onto.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(sanitize_component(segment))
}

/// Derives the archive filename for a page whose content matched
///
/// The URL path is flattened into one component (`/docs/a/` becomes
/// `docs_a.html`); the root page becomes `index.html`. Names that already end
/// in `.html` or `.htm` keep their extension.
pub fn page_file_name(url: &Url) -> String {
    let flattened = sanitize_component(url.path().trim_matches('/')).replace('/', "_");
    let stem = if flattened.is_empty() {
        INDEX_PAGE_NAME.to_string()
    } else {
        flattened
    };

    let lower = stem.to_ascii_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        stem
    } else {
        format!("{}.html", stem)
    }
}

/// Replaces characters that are awkward in filenames
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
