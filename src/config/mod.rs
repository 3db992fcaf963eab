//! Configuration module for FourBot
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is equivalent to
//! `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use fourbot::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fourbot.toml")).unwrap();
//! println!("Workers: {}", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
