/// Page outcome definitions
///
/// Every page the scheduler dispatches ends in exactly one of these states.
use crate::TrawlError;
use std::fmt;

/// Final state of a dispatched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was fetched and its links processed
    Processed,

    /// Page was fetched but is not a document links can be extracted from
    ContentMismatch,

    // ===== Terminal Error States =====
    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Page returned HTTP 429
    RateLimited,

    /// Page fetch failed for other reasons (other status codes, body errors)
    Failed,
}

impl PageState {
    /// Returns true if the page body was retrieved
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::ContentMismatch)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Classifies a fetch error into the state it leaves the page in
    pub fn from_error(error: &TrawlError) -> Self {
        match error {
            TrawlError::HttpStatus { status: 404 | 410, .. } => Self::DeadLink,
            TrawlError::HttpStatus { status: 429, .. } => Self::RateLimited,
            TrawlError::Timeout { .. } | TrawlError::Network { .. } => Self::Unreachable,
            _ => Self::Failed,
        }
    }

    /// Stable lowercase name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::ContentMismatch => "content_mismatch",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::RateLimited => "rate_limited",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Processed,
            Self::ContentMismatch,
            Self::DeadLink,
            Self::Unreachable,
            Self::RateLimited,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a single crawl
///
/// `Running` while new pages are being claimed, `Draining` once the budget,
/// frontier or deadline stops new claims, `Done` when nothing is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Running,
    Draining,
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}
