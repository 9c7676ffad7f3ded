//! Output module for crawl summaries
//!
//! This module handles:
//! - The end-of-crawl summary record
//! - Printing it to the console
//! - Writing it as a markdown report

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_summary;
pub use summary::{CrawlSummary, OutputError, OutputResult};
