//! HTML link extraction
//!
//! This module scans a fetched document for references and splits them into:
//! - file candidates, which the selector says should be downloaded
//! - page candidates, anchors that may be crawled further

use crate::config::FileSelector;
use crate::url::is_http_scheme;
use crate::TrawlError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose references are considered, in a single document-order pass
const REFERENCE_SELECTOR: &str = "a[href], img[src], source[src], video[src], audio[src]";

/// References discovered on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// Absolute URLs the selector picked out for download
    pub files: Vec<String>,

    /// Absolute anchor URLs to continue crawling
    pub pages: Vec<String>,
}

impl ExtractedLinks {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.pages.is_empty()
    }
}

/// Classifies a page's references using a [`FileSelector`]
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    selector: FileSelector,
}

impl LinkExtractor {
    pub fn new(selector: FileSelector) -> Self {
        Self { selector }
    }

    /// Extracts file and page candidates from raw document bytes
    ///
    /// The body is decoded lossily; `base_url` is normally the final URL after
    /// redirects. Only a base URL that cannot be parsed is an error.
    pub fn extract_from_bytes(
        &self,
        bytes: &[u8],
        base_url: &str,
    ) -> Result<ExtractedLinks, TrawlError> {
        let base = Url::parse(base_url).map_err(|e| TrawlError::HtmlParse {
            url: base_url.to_string(),
            message: format!("invalid base URL: {}", e),
        })?;
        let html = String::from_utf8_lossy(bytes);
        Ok(self.extract(&html, &base))
    }

    /// Extracts file and page candidates from an HTML document
    ///
    /// # Classification Rules
    ///
    /// - `<a href>`, `<img src>`, `<source src>`, `<video src>`, `<audio src>` are scanned
    /// - a reference matching the selector is a file candidate, whatever its tag
    /// - an anchor that is not a file candidate is a page candidate
    /// - media references that do not match are ignored
    ///
    /// Both lists are in document order without duplicates. Malformed markup
    /// never fails; it simply yields fewer references.
    ///
    /// # Example
    ///
    /// ```
    /// use trawler::config::FileSelector;
    /// use trawler::crawler::LinkExtractor;
    /// use url::Url;
    ///
    /// let extractor = LinkExtractor::new(".gif".parse::<FileSelector>().unwrap());
    /// let html = r#"<a href="/a.gif">a</a><a href="/next">next</a><img src="b.png">"#;
    /// let base = Url::parse("https://example.com/").unwrap();
    /// let links = extractor.extract(html, &base);
    /// assert_eq!(links.files, vec!["https://example.com/a.gif"]);
    /// assert_eq!(links.pages, vec!["https://example.com/next"]);
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> ExtractedLinks {
        let document = Html::parse_document(html);
        let mut links = ExtractedLinks::default();

        let Ok(selector) = Selector::parse(REFERENCE_SELECTOR) else {
            return links;
        };

        let mut seen_files = HashSet::new();
        let mut seen_pages = HashSet::new();

        for element in document.select(&selector) {
            let is_anchor = element.value().name() == "a";
            let attr = if is_anchor { "href" } else { "src" };

            let Some(url) = element
                .value()
                .attr(attr)
                .and_then(|raw| resolve_link(raw, base_url))
            else {
                continue;
            };

            if self.selector.matches_url(&url) {
                let url = url.to_string();
                if seen_files.insert(url.clone()) {
                    links.files.push(url);
                }
            } else if is_anchor {
                let url = url.to_string();
                if seen_pages.insert(url.clone()) {
                    links.pages.push(url);
                }
            }
        }

        links
    }
}

/// Resolves a reference to an absolute http(s) URL without its fragment
///
/// Returns None if the reference should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only references (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if !is_http_scheme(&absolute_url) {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url)
}
