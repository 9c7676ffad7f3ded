//! File downloads
//!
//! The downloader owns the record of which URLs have been fetched and which
//! destination names are taken. Both are checked and reserved in one step
//! before any network traffic, so concurrent duplicates are skipped rather
//! than raced.

use crate::config::FileSelector;
use crate::crawler::fetcher::Fetcher;
use crate::url::file_name_from_url;
use crate::{TrawlError, UrlError};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// Suffix of the temporary file a download is written to before renaming
const PARTIAL_SUFFIX: &str = ".part";

/// Why a download was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The URL was already downloaded during this crawl
    AlreadyDownloaded,

    /// The destination file exists on disk or is taken by another URL
    AlreadyExists,

    /// Another task is downloading the same URL right now
    InProgress,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AlreadyDownloaded => "already downloaded",
            Self::AlreadyExists => "already exists",
            Self::InProgress => "in progress",
        };
        write!(f, "{}", reason)
    }
}

/// Result of a single download attempt
#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Skipped(SkipReason),
    Failed(TrawlError),
}

impl DownloadOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

#[derive(Debug, Default)]
struct DownloadState {
    /// URLs written to disk
    downloaded: HashSet<String>,

    /// URLs currently being fetched
    in_flight: HashSet<String>,

    /// Destination paths claimed by a finished or running download
    reserved: HashSet<PathBuf>,
}

/// Downloads selected files into the crawl's output directory
#[derive(Debug)]
pub struct Downloader<F: Fetcher> {
    fetcher: F,
    output_dir: PathBuf,
    default_extension: String,
    timeout: Duration,
    state: Mutex<DownloadState>,
    unnamed_counter: AtomicUsize,
}

impl<F: Fetcher> Downloader<F> {
    pub fn new(fetcher: F, output_dir: PathBuf, selector: &FileSelector, timeout: Duration) -> Self {
        Self {
            fetcher,
            output_dir,
            default_extension: selector.default_extension().to_string(),
            timeout,
            state: Mutex::new(DownloadState::default()),
            unnamed_counter: AtomicUsize::new(0),
        }
    }

    /// Number of files downloaded so far
    pub fn downloaded_count(&self) -> usize {
        self.lock().downloaded.len()
    }

    /// Downloads `url` unless it, or its destination, is already taken
    ///
    /// Never returns an error: failures are logged and reported as
    /// [`DownloadOutcome::Failed`].
    pub async fn download(&self, url: &str) -> DownloadOutcome {
        let path = match self.destination(url) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Cannot download {}: {}", url, e);
                return DownloadOutcome::Failed(e);
            }
        };

        if let Some(reason) = self.reserve(url, &path) {
            tracing::debug!("Skipping {} ({})", url, reason);
            return DownloadOutcome::Skipped(reason);
        }

        // Only the reservation holder looks at the disk.
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {
                self.release(url, None);
                tracing::info!("Skipping {} ({} exists)", url, path.display());
                return DownloadOutcome::Skipped(SkipReason::AlreadyExists);
            }
            Ok(false) => {}
            Err(e) => {
                self.release(url, Some(&path));
                let err = TrawlError::storage(&path, e);
                tracing::warn!("Cannot download {}: {}", url, err);
                return DownloadOutcome::Failed(err);
            }
        }

        match self.fetch_to(url, &path).await {
            Ok(bytes) => {
                {
                    let mut state = self.lock();
                    state.in_flight.remove(url);
                    state.downloaded.insert(url.to_string());
                }

                tracing::info!("Downloaded {} ({:.1} KB)", path.display(), bytes as f64 / 1024.0);
                DownloadOutcome::Downloaded { path, bytes }
            }
            Err(e) => {
                self.release(url, Some(&path));
                tracing::warn!("Download failed for {}: {}", url, e);
                DownloadOutcome::Failed(e)
            }
        }
    }

    /// Computes where `url` would be written
    ///
    /// Uses the final path segment, or `file_<n><ext>` when there is none.
    fn destination(&self, url: &str) -> Result<PathBuf, TrawlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let name = file_name_from_url(&parsed).unwrap_or_else(|| {
            let n = self.unnamed_counter.fetch_add(1, Ordering::Relaxed);
            format!("file_{}{}", n, self.default_extension)
        });
        Ok(self.output_dir.join(name))
    }

    /// Claims `url` and `path`, or says why they cannot be claimed
    fn reserve(&self, url: &str, path: &Path) -> Option<SkipReason> {
        let mut state = self.lock();
        if state.downloaded.contains(url) {
            return Some(SkipReason::AlreadyDownloaded);
        }
        if state.in_flight.contains(url) {
            return Some(SkipReason::InProgress);
        }
        if state.reserved.contains(path) {
            return Some(SkipReason::AlreadyExists);
        }

        state.in_flight.insert(url.to_string());
        state.reserved.insert(path.to_path_buf());
        None
    }

    /// Drops the in-flight claim on `url` and, if given, the claim on `path`
    ///
    /// A path found on disk is left reserved so later URLs with the same name
    /// are skipped without touching the filesystem.
    fn release(&self, url: &str, path: Option<&Path>) {
        let mut state = self.lock();
        state.in_flight.remove(url);
        if let Some(path) = path {
            state.reserved.remove(path);
        }
    }

    /// Streams `url` into a `.part` file and renames it to `path` once complete
    async fn fetch_to(&self, url: &str, path: &Path) -> Result<u64, TrawlError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| TrawlError::storage(&self.output_dir, e))?;

        let partial = partial_path(path);
        let bytes = match self.fetcher.fetch_to_file(url, self.timeout, &partial).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(TrawlError::storage(path, e));
        }

        Ok(bytes)
    }

    fn lock(&self) -> MutexGuard<'_, DownloadState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
