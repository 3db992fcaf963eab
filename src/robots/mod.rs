//! Robots.txt handling module
//!
//! This module provides the RobotsGate: fetching a host's robots.txt, parsing
//! it, memoizing the result per host, and answering allow/deny queries.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache, RobotsPolicy};
pub use parser::ParsedRobots;

use crate::url::robots_url;
use crate::CrawlError;
use reqwest::{Client, StatusCode};
use url::Url;

/// Fetches robots.txt for the host of `url`
///
/// Uses the same client as ordinary fetches. Any status other than 200 is
/// reported as an error; callers treat that as "no policy".
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - Any URL on the host whose robots.txt is wanted
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched and parsed robots.txt
/// * `Err(CrawlError::RobotsFetch)` - Transport failure or non-200 status
pub async fn fetch_robots(client: &Client, url: &Url) -> Result<ParsedRobots, CrawlError> {
    let robots = robots_url(url).ok_or_else(|| CrawlError::RobotsFetch {
        url: url.to_string(),
        reason: "URL has no host".to_string(),
    })?;

    let fetch_error = |reason: String| CrawlError::RobotsFetch {
        url: robots.to_string(),
        reason,
    };

    let response = client
        .get(robots.clone())
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(fetch_error(format!(
            "robots.txt not found (status {})",
            response.status().as_u16()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    Ok(ParsedRobots::from_content(&body))
}

/// Checks if a path is allowed by a host's policy
///
/// An absent policy allows everything.
///
/// # Returns
///
/// * `true` - If the path is allowed or no policy is known
/// * `false` - If the policy explicitly disallows `path` for `user_agent`
pub fn is_allowed(policy: Option<&CachedRobots>, path: &str, user_agent: &str) -> bool {
    policy.map_or(true, |robots| robots.is_allowed(path, user_agent))
}
