//! Crawl summary types
//!
//! A [`CrawlSummary`] is the end-of-run record printed to stdout and
//! optionally written as markdown.

use crate::config::Config;
use crate::crawler::CrawlStats;
use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of one finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub seed: String,
    pub selector: String,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: Option<String>,

    // Counters gathered by the scheduler
    pub stats: CrawlStats,
}

impl CrawlSummary {
    /// Builds the summary of a crawl run with `config`
    pub fn new(
        config: &Config,
        stats: CrawlStats,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seed: config.seed.clone(),
            selector: config.files.to_string(),
            output_dir: config.output_dir().unwrap_or_default(),
            started_at,
            finished_at,
            config_hash: None,
            stats,
        }
    }

    /// Attaches the hash of the config file the crawl was started from
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn pages_crawled(&self) -> u32 {
        self.stats.pages_crawled
    }

    pub fn files_downloaded(&self) -> u32 {
        self.stats.files_downloaded
    }

    pub fn pages_saved(&self) -> u32 {
        self.stats.pages_saved
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.stats.elapsed_seconds()
    }

    /// Returns the total number of pages that finished
    pub fn total_completed_pages(&self) -> u32 {
        self.stats.page_states.values().sum()
    }

    /// Returns the share of finished pages whose body was retrieved, as a percentage
    pub fn success_rate(&self) -> f64 {
        let completed = self.total_completed_pages();
        if completed == 0 {
            return 0.0;
        }
        let succeeded: u32 = PageState::all_states()
            .into_iter()
            .filter(PageState::is_success)
            .map(|state| self.stats.count(state))
            .sum();
        (succeeded as f64 / completed as f64) * 100.0
    }

    /// Returns the error rate as a percentage
    pub fn error_rate(&self) -> f64 {
        let completed = self.total_completed_pages();
        if completed == 0 {
            return 0.0;
        }
        100.0 - self.success_rate()
    }
}
