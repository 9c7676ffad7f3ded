//! Configuration module for Trawler
//!
//! A crawl is described by a [`Config`], built either from command-line
//! arguments or from a TOML file. Both paths go through [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod selector;
mod types;
mod validation;

// Re-export types
pub use selector::FileSelector;
pub use types::{Config, ContentConfig, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
