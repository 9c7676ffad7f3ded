//! Trawler: a breadth-first file harvester
//!
//! This crate crawls a website from a seed URL, downloads every linked file that
//! matches a selector, and optionally archives pages whose body matches a pattern.
//! Page fetches run concurrently under a fixed cap while each page's downloads
//! proceed alongside the rest of the crawl.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Trawler operations
///
/// Everything except [`TrawlError::Config`] is contained at the task boundary
/// where it happens: it is logged and counted, never allowed to stop the crawl.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Robots.txt error: {0}")]
    Robots(String),

    #[error("Invalid content pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl TrawlError {
    /// Returns true if the crawl can carry on after this error
    ///
    /// Only configuration problems are fatal, and those are raised before the
    /// first request is made.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Wraps an IO failure with the path it happened on
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid file selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Trawler operations
pub type Result<T> = std::result::Result<T, TrawlError>;

// Re-export commonly used types
pub use crate::config::{Config, FileSelector};
pub use crate::crawler::{CrawlScheduler, CrawlStats};
pub use crate::state::{CrawlPhase, PageState};
pub use crate::url::{normalize_url, same_origin_host};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        let config = TrawlError::Config(ConfigError::Validation("bad".to_string()));
        assert!(!config.is_recoverable());

        let network = TrawlError::Network {
            url: "https://example.com/".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(network.is_recoverable());

        let status = TrawlError::HttpStatus {
            url: "https://example.com/missing".to_string(),
            status: 404,
        };
        assert!(status.is_recoverable());
        assert_eq!(status.to_string(), "HTTP 404 for https://example.com/missing");
    }

    #[test]
    fn test_storage_error_mentions_path() {
        let err = TrawlError::storage(
            "/tmp/out/a.gif",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/out/a.gif"));
    }
}
