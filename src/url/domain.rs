use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the `host[:port]` identity used for the same-domain restriction
///
/// The port is only included when it differs from the scheme's default, so
/// `http://example.com/` and `http://example.com:80/` share an identity while
/// two local servers on different ports do not.
pub fn host_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks whether two URLs live on the same host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawler::url::same_origin_host;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// let inside = Url::parse("https://Example.com/gallery").unwrap();
/// let outside = Url::parse("https://cdn.example.com/a.gif").unwrap();
/// assert!(same_origin_host(&seed, &inside));
/// assert!(!same_origin_host(&seed, &outside));
/// ```
pub fn same_origin_host(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
