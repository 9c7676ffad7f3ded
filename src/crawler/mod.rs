//! Crawler module for page fetching, link following and file harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] seam
//! - HTML parsing and link extraction
//! - The deduplicating frontier
//! - File downloads and content-matched page archiving
//! - Bounded-concurrency scheduling

mod content;
mod downloader;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use content::{ContentMatcher, MatchArchive, SaveOutcome, MATCHING_PAGES_DIR};
pub use downloader::{DownloadOutcome, Downloader, SkipReason};
pub use fetcher::{build_http_client, FetchedBody, Fetcher, HttpFetcher};
pub use frontier::{CrawlTarget, FrontierStore, Rejection};
pub use parser::{ExtractedLinks, LinkExtractor};
pub use scheduler::{CrawlScheduler, CrawlStats, PageOutcome};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::TrawlError;
use chrono::Utc;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Load robots.txt if requested
/// 3. Crawl breadth-first from the seed, downloading selected files
/// 4. Return a summary of the run
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl ran to completion (individual page failures are counted, not raised)
/// * `Err(TrawlError)` - The configuration was rejected before any request was made
pub async fn crawl(config: Config) -> Result<CrawlSummary, TrawlError> {
    let mut scheduler = CrawlScheduler::new(config)?;
    run_to_summary(&mut scheduler).await
}

/// Runs a crawl with a caller-supplied [`Fetcher`]
pub async fn crawl_with_fetcher<F: Fetcher>(
    config: Config,
    fetcher: F,
) -> Result<CrawlSummary, TrawlError> {
    let mut scheduler = CrawlScheduler::with_fetcher(config, fetcher)?;
    run_to_summary(&mut scheduler).await
}

async fn run_to_summary<F: Fetcher>(
    scheduler: &mut CrawlScheduler<F>,
) -> Result<CrawlSummary, TrawlError> {
    let started_at = Utc::now();
    let stats = scheduler.run().await?;
    let finished_at = Utc::now();

    Ok(CrawlSummary::new(
        scheduler.config(),
        stats,
        started_at,
        finished_at,
    ))
}
