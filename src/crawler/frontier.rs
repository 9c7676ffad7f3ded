//! Crawl frontier: the pending queue and the visited/queued sets
//!
//! All three collections live behind one mutex so that the dedup check and
//! the insert happen as a single step. The lock is never held across an
//! `.await`.

use crate::robots::RobotsGate;
use crate::url::{host_key, normalize_url};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// A URL waiting to be fetched, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: u32,
}

/// Why a URL is not eligible for crawling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not an absolute http(s) URL with a host
    UnsupportedUrl,

    /// A fetch for this URL has already been dispatched
    AlreadyVisited,

    /// Deeper than the configured maximum depth
    TooDeep,

    /// Host differs from the seed's host while same-domain mode is on
    OffDomain,

    /// Disallowed by the seed origin's robots.txt
    RobotsDenied,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnsupportedUrl => "unsupported URL",
            Self::AlreadyVisited => "already visited",
            Self::TooDeep => "beyond max depth",
            Self::OffDomain => "outside seed domain",
            Self::RobotsDenied => "disallowed by robots.txt",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    /// URLs whose fetch has been dispatched
    visited: HashSet<String>,

    /// URLs ever placed on `pending`; never shrinks
    queued: HashSet<String>,

    /// FIFO of targets not yet claimed
    pending: VecDeque<CrawlTarget>,
}

/// Owns crawl dedup state and the breadth-first work queue
#[derive(Debug)]
pub struct FrontierStore {
    state: Mutex<FrontierState>,
    robots: Arc<RobotsGate>,
    seed_host: Option<String>,
    max_depth: u32,
    same_domain_only: bool,
}

impl FrontierStore {
    pub fn new(seed: &Url, max_depth: u32, same_domain_only: bool, robots: Arc<RobotsGate>) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            robots,
            seed_host: host_key(seed),
            max_depth,
            same_domain_only,
        }
    }

    /// Queues `url` at `depth` unless it has been seen before
    ///
    /// The URL is normalized (fragment removed) first. Returns true only if
    /// the URL was new and is now pending. Unparseable URLs are never queued.
    pub fn try_enqueue(&self, url: &str, depth: u32) -> bool {
        let Ok(normalized) = normalize_url(url) else {
            return false;
        };
        let key = normalized.to_string();

        let mut state = self.lock();
        if state.visited.contains(&key) || state.queued.contains(&key) {
            return false;
        }

        state.queued.insert(key.clone());
        state.pending.push_back(CrawlTarget { url: key, depth });
        true
    }

    /// Takes the oldest pending target
    pub fn claim(&self) -> Option<CrawlTarget> {
        self.lock().pending.pop_front()
    }

    /// Records that a fetch for `url` has been dispatched
    pub fn mark_visited(&self, url: &str) {
        let key = normalize_url(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.lock().visited.insert(key);
    }

    /// Returns true if `url` at `depth` may be crawled
    pub fn is_eligible(&self, url: &str, depth: u32) -> bool {
        self.rejection(url, depth).is_none()
    }

    /// Explains why `url` at `depth` may not be crawled, if it may not
    pub fn rejection(&self, url: &str, depth: u32) -> Option<Rejection> {
        let Ok(parsed) = normalize_url(url) else {
            return Some(Rejection::UnsupportedUrl);
        };

        if self.lock().visited.contains(parsed.as_str()) {
            return Some(Rejection::AlreadyVisited);
        }

        if depth > self.max_depth {
            return Some(Rejection::TooDeep);
        }

        if self.same_domain_only && host_key(&parsed) != self.seed_host {
            return Some(Rejection::OffDomain);
        }

        if !self.robots.allows(parsed.as_str()) {
            return Some(Rejection::RobotsDenied);
        }

        None
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.lock().visited.len()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // A panicked holder cannot leave the sets half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
