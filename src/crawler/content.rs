//! Content matching and the archive of matching pages

use crate::url::page_file_name;
use crate::{TrawlError, UrlError};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Subdirectory of the output directory that holds matching pages
pub const MATCHING_PAGES_DIR: &str = "matching_pages";

/// Case-insensitive, multi-line pattern tested against page bodies
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    pattern: Regex,
}

impl ContentMatcher {
    /// Compiles `pattern` with case-insensitive and multi-line flags
    pub fn compile(pattern: &str) -> Result<Self, TrawlError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// Builds the matcher for an optional configured pattern
    ///
    /// An invalid pattern is logged and yields `None`: the crawl then runs
    /// without content matching.
    pub fn from_pattern(pattern: Option<&str>) -> Option<Self> {
        let pattern = pattern?;
        match Self::compile(pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                tracing::warn!("Content matching disabled: {}", e);
                None
            }
        }
    }

    /// Tests the (lossily decoded) body against the pattern
    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.pattern.is_match(&String::from_utf8_lossy(bytes))
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Result of asking the archive to keep a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to this path
    Saved(PathBuf),

    /// The URL, or its derived filename, was already saved
    Duplicate,
}

#[derive(Debug, Default)]
struct ArchiveState {
    urls: HashSet<String>,
    file_names: HashSet<String>,
}

/// Writes matching page bodies into `matching_pages/`
#[derive(Debug)]
pub struct MatchArchive {
    dir: PathBuf,
    state: Mutex<ArchiveState>,
}

impl MatchArchive {
    /// Creates an archive rooted at `<output_dir>/matching_pages`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            dir: output_dir.join(MATCHING_PAGES_DIR),
            state: Mutex::new(ArchiveState::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `bytes` verbatim under a name derived from `url`
    ///
    /// A URL is saved at most once, and so is a filename: a second page whose
    /// path flattens to the same name is reported as a duplicate, as is a
    /// file already on disk.
    pub async fn save(&self, url: &str, bytes: &[u8]) -> Result<SaveOutcome, TrawlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let file_name = page_file_name(&parsed);

        {
            let mut state = self.lock();
            if state.urls.contains(url) || state.file_names.contains(&file_name) {
                return Ok(SaveOutcome::Duplicate);
            }
            state.urls.insert(url.to_string());
            state.file_names.insert(file_name.clone());
        }

        let path = self.dir.join(&file_name);
        match self.write(&path, bytes).await {
            Ok(true) => Ok(SaveOutcome::Saved(path)),
            Ok(false) => Ok(SaveOutcome::Duplicate),
            Err(e) => {
                let mut state = self.lock();
                state.urls.remove(url);
                state.file_names.remove(&file_name);
                Err(e)
            }
        }
    }

    /// Writes the file unless something is already at `path`
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<bool, TrawlError> {
        if tokio::fs::try_exists(path)
            .await
            .map_err(|e| TrawlError::storage(path, e))?
        {
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| TrawlError::storage(&self.dir, e))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| TrawlError::storage(path, e))?;
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, ArchiveState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
