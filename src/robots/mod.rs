//! Robots.txt handling module
//!
//! A crawl consults at most one robots.txt: the one at the root of the seed's
//! origin. It is fetched once before the first page and never refreshed.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Fetcher;
use crate::TrawlError;
use std::time::Duration;
use url::Url;

/// Crawl-wide robots policy check
///
/// A gate that is disabled, or whose robots.txt could not be retrieved,
/// permits every URL.
#[derive(Debug, Clone)]
pub struct RobotsGate {
    robots: ParsedRobots,
    agent: String,
    enabled: bool,
}

impl RobotsGate {
    /// A gate that permits everything without fetching anything
    pub fn disabled() -> Self {
        Self {
            robots: ParsedRobots::allow_all(),
            agent: String::new(),
            enabled: false,
        }
    }

    /// Builds a gate around an already-parsed robots.txt
    pub fn from_robots(robots: ParsedRobots, agent: impl Into<String>) -> Self {
        Self {
            robots,
            agent: agent.into(),
            enabled: true,
        }
    }

    /// Fetches and parses the seed origin's robots.txt
    ///
    /// Any failure (network, status, unreadable body) is logged and the gate
    /// falls back to allowing everything.
    pub async fn load<F: Fetcher>(fetcher: &F, seed: &Url, agent: &str, timeout: Duration) -> Self {
        let robots = match fetch_robots(fetcher, seed, timeout).await {
            Ok(robots) => robots,
            Err(TrawlError::HttpStatus { status: 404, url }) => {
                tracing::debug!("No robots.txt at {}, allowing all", url);
                ParsedRobots::allow_all()
            }
            Err(e) => {
                tracing::warn!("Could not load robots.txt, allowing all: {}", e);
                ParsedRobots::allow_all()
            }
        };

        Self::from_robots(robots, agent)
    }

    /// Returns true if fetching `url` is permitted
    pub fn allows(&self, url: &str) -> bool {
        if !self.enabled {
            return true;
        }
        self.robots.is_allowed(url, &self.agent)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Location of the robots.txt governing `seed`: `<scheme>://<host[:port]>/robots.txt`
pub fn robots_url(seed: &Url) -> Result<Url, TrawlError> {
    seed.join("/robots.txt")
        .map_err(|e| TrawlError::Robots(format!("cannot derive robots.txt URL from {}: {}", seed, e)))
}

/// Fetches robots.txt for the seed's origin
async fn fetch_robots<F: Fetcher>(
    fetcher: &F,
    seed: &Url,
    timeout: Duration,
) -> Result<ParsedRobots, TrawlError> {
    let url = robots_url(seed)?;
    let body = fetcher.fetch(url.as_str(), timeout).await?;
    let text = String::from_utf8_lossy(&body.bytes);
    tracing::debug!("Loaded robots.txt from {} ({} bytes)", url, body.bytes.len());
    Ok(ParsedRobots::from_content(&text))
}
