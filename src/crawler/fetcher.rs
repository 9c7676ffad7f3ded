//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for pages and robots.txt, buffered in memory
//! - Streaming file downloads straight to disk
//! - Redirect handling
//! - Error classification

use crate::config::UserAgentConfig;
use crate::TrawlError;
use futures::StreamExt;
use reqwest::{redirect::Policy, Client, Response};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched response body
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects
    pub final_url: String,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Raw response body
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Returns true if the body can carry links worth extracting
    ///
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_markup(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(content_type) => {
                let lower = content_type.to_ascii_lowercase();
                lower.contains("html") || lower.contains("xml") || lower.starts_with("text/")
            }
        }
    }
}

/// Fetches the body of a URL.
///
/// Non-2xx responses are reported as [`TrawlError::HttpStatus`]; connection
/// failures and timeouts as [`TrawlError::Network`] / [`TrawlError::Timeout`].
pub trait Fetcher: Send + Sync + Clone + 'static {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchedBody, TrawlError>> + Send;

    /// Writes the body of `url` into a new file at `dest`, returning its size
    ///
    /// The default buffers the whole body through [`Fetcher::fetch`].
    fn fetch_to_file(
        &self,
        url: &str,
        timeout: Duration,
        dest: &Path,
    ) -> impl Future<Output = Result<u64, TrawlError>> + Send {
        async move {
            let body = self.fetch(url, timeout).await?;
            tokio::fs::write(dest, &body.bytes)
                .await
                .map_err(|e| TrawlError::storage(dest, e))?;
            Ok(body.bytes.len() as u64)
        }
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client identified by `config`
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, TrawlError> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Sends a GET and rejects non-2xx responses
    ///
    /// `timeout` covers the whole exchange, body included.
    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, TrawlError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedBody, TrawlError> {
        let response = self.get(url, timeout).await?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(FetchedBody {
            final_url,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// Streams the body to `dest` chunk by chunk
    async fn fetch_to_file(
        &self,
        url: &str,
        timeout: Duration,
        dest: &Path,
    ) -> Result<u64, TrawlError> {
        let response = self.get(url, timeout).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| TrawlError::storage(dest, e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify_error(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| TrawlError::storage(dest, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| TrawlError::storage(dest, e))?;
        Ok(written)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Per-request timeouts are applied by the caller, so the client itself only
/// bounds connection setup.
///
/// # Example
///
/// ```no_run
/// use trawler::config::UserAgentConfig;
/// use trawler::crawler::build_http_client;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a transport error onto the crawl error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> TrawlError {
    if error.is_timeout() {
        TrawlError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TrawlError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else if let Some(status) = error.status() {
        TrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        TrawlError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
