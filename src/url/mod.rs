//! URL handling module for Trawler
//!
//! This module provides URL normalization, host identity for the same-domain
//! restriction, and the filesystem names derived from URLs.

mod domain;
mod naming;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, host_key, same_origin_host};
pub use naming::{file_name_from_url, output_dir_name, page_file_name};
pub use normalize::{is_http_scheme, normalize_url};
