//! URL handling module for FourBot
//!
//! This module validates the operator's comma-separated URL list and derives
//! the per-host values the crawler needs (cache keys and robots.txt URLs).

mod domain;
mod list;

// Re-export main functions
pub use domain::{host_key, request_path, robots_url};
pub use list::{parse_target, validate_urls};
