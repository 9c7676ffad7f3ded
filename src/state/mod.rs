//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the outcome of each dispatched page (processed, dead link, unreachable, etc.)
//! - `CrawlPhase`: where the crawl as a whole is in its lifecycle

mod page_state;

// Re-export main types
pub use page_state::{CrawlPhase, PageState};
