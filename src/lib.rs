//! FourBot: a polite concurrent URL fetcher
//!
//! This crate fetches an operator-supplied list of URLs with a fixed pool of
//! workers, honoring a global request-rate ceiling and per-host robots.txt
//! policy, and reports one outcome per URL.

pub mod config;
pub mod crawler;
pub mod input;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for FourBot operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to fetch robots.txt from {url}: {reason}")]
    RobotsFetch { url: String, reason: String },

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Batch-level input errors, raised before any dispatch begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no URLs given")]
    Empty,

    #[error("invalid URL #{position}: {url}")]
    InvalidUrl { position: usize, url: String },
}

/// Classified failure of a single fetch
///
/// Every per-URL failure ends up in that URL's [`crawler::FetchResult`];
/// none of them terminate the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("disallowed by robots.txt")]
    RobotsDisallowed,

    #[error("timeout error: {0}")]
    Timeout(String),

    #[error("stopped after too many redirects: {0}")]
    TooManyRedirects(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("status code: {0}")]
    BadStatus(u16),

    #[error("failed to read body: {0}")]
    BodyRead(String),
}

impl FetchError {
    /// Stable label for this error's class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid-url",
            Self::RobotsDisallowed => "robots-disallowed",
            Self::Timeout(_) => "timeout",
            Self::TooManyRedirects(_) => "too-many-redirects",
            Self::Network(_) => "network",
            Self::BadStatus(_) => "bad-status",
            Self::BodyRead(_) => "body-read",
        }
    }
}

/// Result type alias for FourBot operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, FetchResult};
pub use url::validate_urls;
