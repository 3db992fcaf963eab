//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler:
//! - Building the shared HTTP client (user agent, timeout, redirect cap)
//! - Performing one GET per target
//! - Classifying the outcome into a [`FetchError`]

use crate::config::HttpConfig;
use crate::url::parse_target;
use crate::FetchError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::error::Error as _;

/// Outcome of fetching one job
///
/// Exactly one of these is produced for every job that enters the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The URL as it was submitted
    pub url: String,

    /// Decoded body text, or the classified failure
    pub outcome: Result<String, FetchError>,
}

impl FetchResult {
    pub fn success(url: impl Into<String>, body: String) -> Self {
        Self {
            url: url.into(),
            outcome: Ok(body),
        }
    }

    pub fn failure(url: impl Into<String>, error: FetchError) -> Self {
        Self {
            url: url.into(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The body, if the fetch succeeded
    pub fn body(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    /// The classified error, if the fetch failed
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }
}

/// Builds the HTTP client shared by page and robots.txt fetches
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use fourbot::config::HttpConfig;
/// use fourbot::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Classification
///
/// Checked in this order; the first match wins:
///
/// | Condition | Result |
/// |-----------|--------|
/// | URL does not parse | `InvalidUrl`, no request made |
/// | Client or connection deadline fired | `Timeout` |
/// | Redirect cap exceeded | `TooManyRedirects` |
/// | Any other transport failure | `Network` |
/// | Status other than 200 | `BadStatus(code)` |
/// | Body could not be read | `BodyRead` |
/// | Otherwise | success with the decoded body |
///
/// The response is owned by this function and dropped before it returns,
/// which releases the connection on every path.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let Some(target) = parse_target(url) else {
        return FetchResult::failure(url, FetchError::InvalidUrl(url.to_string()));
    };

    let response = match client.get(target).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::failure(url, classify_transport_error(&e)),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::failure(url, FetchError::BadStatus(status.as_u16()));
    }

    match response.text().await {
        Ok(body) => FetchResult::success(url, body),
        Err(e) => {
            tracing::warn!("Error reading body of {}: {}", url, e);
            FetchResult::failure(url, FetchError::BodyRead(e.to_string()))
        }
    }
}

/// Maps a transport-level reqwest error onto the closed error set
pub fn classify_transport_error(error: &reqwest::Error) -> FetchError {
    if error.is_timeout() || has_timed_out_source(error) {
        FetchError::Timeout(error.to_string())
    } else if error.is_redirect() {
        FetchError::TooManyRedirects(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

/// Whether any error in the source chain is an I/O timeout
fn has_timed_out_source(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
