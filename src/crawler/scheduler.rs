//! Crawl scheduler: bounded-concurrency breadth-first page dispatch
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - The page budget, counted when a page is dispatched
//! - Per-page work: fetch, content match, link extraction, downloads, enqueue
//! - Folding per-page outcomes into crawl statistics

use crate::config::{validate, Config};
use crate::crawler::content::{ContentMatcher, MatchArchive, SaveOutcome};
use crate::crawler::downloader::{DownloadOutcome, Downloader};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{CrawlTarget, FrontierStore};
use crate::crawler::parser::{ExtractedLinks, LinkExtractor};
use crate::robots::RobotsGate;
use crate::state::{CrawlPhase, PageState};
use crate::url::normalize_url;
use crate::{ConfigError, TrawlError};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Completed pages between progress log lines
const PROGRESS_INTERVAL: u32 = 10;

/// Statistics accumulated over one crawl
///
/// Only the scheduler loop mutates these; page tasks report back through
/// [`PageOutcome`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    /// Page fetches started (counted at dispatch)
    pub pages_crawled: u32,

    /// Dispatched pages that ended in an error state
    pub pages_failed: u32,

    /// Pages written to `matching_pages/`
    pub pages_saved: u32,

    /// Page candidates newly admitted to the frontier
    pub pages_enqueued: u32,

    pub files_downloaded: u32,
    pub files_skipped: u32,
    pub files_failed: u32,

    /// Final state of every completed page
    pub page_states: HashMap<PageState, u32>,

    /// Completed pages per depth
    pub pages_by_depth: BTreeMap<u32, u32>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Number of completed pages that ended in `state`
    pub fn count(&self, state: PageState) -> u32 {
        self.page_states.get(&state).copied().unwrap_or(0)
    }

    fn record(&mut self, outcome: &PageOutcome) {
        *self.page_states.entry(outcome.state).or_insert(0) += 1;
        *self.pages_by_depth.entry(outcome.depth).or_insert(0) += 1;
        if outcome.state.is_error() {
            self.pages_failed += 1;
        }
        if outcome.page_saved {
            self.pages_saved += 1;
        }
        self.pages_enqueued += outcome.pages_enqueued;
        self.files_downloaded += outcome.files_downloaded;
        self.files_skipped += outcome.files_skipped;
        self.files_failed += outcome.files_failed;
    }
}

/// What a single page task reports when it finishes
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub url: String,
    pub depth: u32,
    pub state: PageState,
    pub page_saved: bool,
    pub pages_enqueued: u32,
    pub files_downloaded: u32,
    pub files_skipped: u32,
    pub files_failed: u32,
}

impl PageOutcome {
    fn new(target: &CrawlTarget) -> Self {
        Self {
            url: target.url.clone(),
            depth: target.depth,
            state: PageState::Failed,
            page_saved: false,
            pages_enqueued: 0,
            files_downloaded: 0,
            files_skipped: 0,
            files_failed: 0,
        }
    }

    fn tally(&mut self, downloads: &[DownloadOutcome]) {
        for download in downloads {
            match download {
                DownloadOutcome::Downloaded { .. } => self.files_downloaded += 1,
                DownloadOutcome::Skipped(_) => self.files_skipped += 1,
                DownloadOutcome::Failed(_) => self.files_failed += 1,
            }
        }
    }
}

/// Matcher plus the archive its hits are written to
#[derive(Debug)]
struct ContentCapture {
    matcher: ContentMatcher,
    archive: MatchArchive,
}

/// Everything a page task needs, shared between all tasks of one crawl
struct PageContext<F: Fetcher> {
    fetcher: F,
    frontier: Arc<FrontierStore>,
    extractor: LinkExtractor,
    downloader: Downloader<F>,
    capture: Option<ContentCapture>,
    page_timeout: Duration,
    delay: Duration,
    max_depth: u32,
}

/// Drives one crawl from the seed to an empty frontier or exhausted budget
pub struct CrawlScheduler<F: Fetcher = HttpFetcher> {
    config: Config,
    fetcher: F,
    phase: CrawlPhase,
}

impl CrawlScheduler<HttpFetcher> {
    /// Creates a scheduler that fetches over HTTP
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, TrawlError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> CrawlScheduler<F> {
    /// Creates a scheduler around any [`Fetcher`]
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, TrawlError> {
        validate(&config)?;
        Ok(Self {
            config,
            fetcher,
            phase: CrawlPhase::Running,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// Page and download failures are logged and counted; the only errors
    /// returned are configuration problems detected before the first fetch.
    pub async fn run(&mut self) -> Result<CrawlStats, TrawlError> {
        let started = Instant::now();
        let crawler = self.config.crawler.clone();

        let seed = normalize_url(&self.config.seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.config.seed, e)))?;
        let output_dir = self.config.output_dir()?;

        let robots = if crawler.respect_robots {
            RobotsGate::load(
                &self.fetcher,
                &seed,
                &self.config.user_agent.crawler_name,
                crawler.page_timeout(),
            )
            .await
        } else {
            RobotsGate::disabled()
        };

        let frontier = Arc::new(FrontierStore::new(
            &seed,
            crawler.max_depth,
            crawler.same_domain_only,
            Arc::new(robots),
        ));

        let capture = ContentMatcher::from_pattern(self.config.content.pattern.as_deref()).map(
            |matcher| ContentCapture {
                matcher,
                archive: MatchArchive::new(&output_dir),
            },
        );
        if let Some(capture) = &capture {
            tracing::info!(
                "Saving pages matching /{}/ to {}",
                capture.matcher.as_str(),
                capture.archive.dir().display()
            );
        }

        let ctx = Arc::new(PageContext {
            fetcher: self.fetcher.clone(),
            frontier: Arc::clone(&frontier),
            extractor: LinkExtractor::new(self.config.files.clone()),
            downloader: Downloader::new(
                self.fetcher.clone(),
                output_dir.clone(),
                &self.config.files,
                crawler.download_timeout(),
            ),
            capture,
            page_timeout: crawler.page_timeout(),
            delay: crawler.delay(),
            max_depth: crawler.max_depth,
        });

        tracing::info!(
            "Starting crawl of {} for {} (max depth {}, max pages {}, {} concurrent)",
            seed,
            self.config.files,
            crawler.max_depth,
            crawler.max_pages,
            crawler.max_concurrent
        );
        tracing::info!("Saving files to {}", output_dir.display());

        frontier.try_enqueue(seed.as_str(), 0);

        let semaphore = Arc::new(Semaphore::new(crawler.max_concurrent as usize));
        // A limit too large to represent is no limit at all.
        let deadline = crawler
            .crawl_timeout()
            .and_then(|limit| started.checked_add(limit));
        let mut tasks = JoinSet::new();
        let mut stats = CrawlStats::default();
        let mut last_progress = 0;
        self.phase = CrawlPhase::Running;

        loop {
            if self.phase == CrawlPhase::Running {
                self.dispatch(&ctx, &semaphore, &mut tasks, &mut stats, deadline);
            }

            // Wait for one slot to free, then refill.
            match tasks.join_next().await {
                Some(Ok(outcome)) => {
                    tracing::debug!(
                        "Finished {} (depth {}): {}",
                        outcome.url,
                        outcome.depth,
                        outcome.state
                    );
                    stats.record(&outcome);
                }
                Some(Err(e)) => {
                    tracing::error!("Page task aborted: {}", e);
                    stats.pages_failed += 1;
                }
                None => break,
            }

            let completed: u32 = stats.page_states.values().sum();
            if progress_due(completed, last_progress) {
                last_progress = completed;
                let rate = completed as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {} files, {:.2} pages/sec",
                    stats.pages_crawled,
                    frontier.pending_len(),
                    stats.files_downloaded,
                    rate
                );
            }
        }

        self.phase = CrawlPhase::Done;
        stats.elapsed = started.elapsed();

        tracing::info!(
            "Crawl completed: {} pages crawled, {} files downloaded, {} pages saved in {:.2}s",
            stats.pages_crawled,
            stats.files_downloaded,
            stats.pages_saved,
            stats.elapsed_seconds()
        );

        Ok(stats)
    }

    /// Starts page tasks until capacity, budget, deadline or frontier runs out
    ///
    /// Moves the phase to `Draining` once no further page may ever be started.
    fn dispatch(
        &mut self,
        ctx: &Arc<PageContext<F>>,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<PageOutcome>,
        stats: &mut CrawlStats,
        deadline: Option<Instant>,
    ) {
        let max_pages = self.config.crawler.max_pages;

        while stats.pages_crawled < max_pages {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::warn!(
                    "Crawl deadline reached, waiting for {} in-flight pages",
                    tasks.len()
                );
                self.phase = CrawlPhase::Draining;
                return;
            }

            let Ok(permit) = Arc::clone(semaphore).try_acquire_owned() else {
                return;
            };
            let Some(target) = ctx.frontier.claim() else {
                return;
            };

            if let Some(reason) = ctx.frontier.rejection(&target.url, target.depth) {
                tracing::debug!("Dropping {} at dispatch: {}", target.url, reason);
                continue;
            }

            ctx.frontier.mark_visited(&target.url);
            stats.pages_crawled += 1;
            tracing::info!(
                "[{}/{}] Crawling (depth {}): {}",
                stats.pages_crawled,
                max_pages,
                target.depth,
                target.url
            );

            let ctx = Arc::clone(ctx);
            tasks.spawn(async move {
                let _permit = permit;
                process_page(&ctx, target).await
            });
        }

        tracing::info!(
            "Page budget of {} reached, draining {} in-flight pages",
            max_pages,
            tasks.len()
        );
        self.phase = CrawlPhase::Draining;
    }
}

/// Fetches one page and handles everything found on it
async fn process_page<F: Fetcher>(ctx: &PageContext<F>, target: CrawlTarget) -> PageOutcome {
    let mut outcome = PageOutcome::new(&target);

    let body = match ctx.fetcher.fetch(&target.url, ctx.page_timeout).await {
        Ok(body) => body,
        Err(e) => {
            outcome.state = PageState::from_error(&e);
            tracing::warn!("Failed to fetch {}: {}", target.url, e);
            pause(ctx.delay).await;
            return outcome;
        }
    };

    if let Some(capture) = &ctx.capture {
        if capture.matcher.matches(&body.bytes) {
            match capture.archive.save(&target.url, &body.bytes).await {
                Ok(SaveOutcome::Saved(path)) => {
                    tracing::info!("Pattern matched {}, saved to {}", target.url, path.display());
                    outcome.page_saved = true;
                }
                Ok(SaveOutcome::Duplicate) => {
                    tracing::debug!("Pattern matched {}, already saved", target.url);
                }
                Err(e) => tracing::warn!("Failed to save matching page {}: {}", target.url, e),
            }
        }
    }

    if !body.is_markup() {
        tracing::debug!(
            "Not extracting links from {} ({})",
            target.url,
            body.content_type.as_deref().unwrap_or("unknown type")
        );
        outcome.state = PageState::ContentMismatch;
        pause(ctx.delay).await;
        return outcome;
    }

    let links = match ctx
        .extractor
        .extract_from_bytes(&body.bytes, &body.final_url)
    {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", target.url, e);
            ExtractedLinks::default()
        }
    };
    drop(body);
    outcome.state = PageState::Processed;

    if target.depth < ctx.max_depth {
        let depth = target.depth + 1;
        for page in &links.pages {
            if ctx.frontier.is_eligible(page, depth) && ctx.frontier.try_enqueue(page, depth) {
                outcome.pages_enqueued += 1;
            }
        }
    }

    if !links.files.is_empty() {
        tracing::info!("Found {} file(s) on {}", links.files.len(), target.url);
        let downloads = join_all(links.files.iter().map(|url| ctx.downloader.download(url))).await;
        outcome.tally(&downloads);
    }

    pause(ctx.delay).await;
    outcome
}

/// Progress is logged once for every tenth completed page
fn progress_due(completed: u32, last_logged: u32) -> bool {
    completed > last_logged && completed % PROGRESS_INTERVAL == 0
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
