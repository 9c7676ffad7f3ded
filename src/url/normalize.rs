use crate::UrlError;
use url::Url;

/// Normalizes a URL for frontier bookkeeping
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after #)
///
/// Host case and default ports are already canonicalized by the `url` parser,
/// so `HTTP://Example.COM:80/a#top` and `http://example.com/a` normalize to the
/// same string. Paths and query strings are left untouched: two URLs that differ
/// there are treated as different resources.
///
/// # Examples
///
/// ```
/// use trawler::url::normalize_url;
///
/// let url = normalize_url("https://example.com/gallery#photo-3").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/gallery");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns true for http and https URLs
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
