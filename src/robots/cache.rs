//! Per-host robots.txt memoization
//!
//! Each host's robots.txt is fetched at most once per run. A failed fetch is
//! memoized as well, as "no policy", so the host is treated as allow-all
//! without being asked again.

use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::host_key;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// A host's robots.txt policy together with the time it was fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Wraps freshly fetched rules, stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Returns how long ago the robots.txt was fetched
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Checks if a path is allowed according to the cached robots.txt
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        self.content.is_allowed(path, user_agent)
    }
}

/// A host's policy as seen by the crawler; `None` means "no policy known"
pub type RobotsPolicy = Option<Arc<CachedRobots>>;

/// Keyed cache from host to policy-or-absent
///
/// Safe to share between tasks; lookups only take a read lock.
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    entries: RwLock<HashMap<String, RobotsPolicy>>,
}

impl RobotsCache {
    /// Creates an empty cache that fetches with the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the memoized policy for a host, if it has been resolved
    pub async fn get(&self, key: &str) -> Option<RobotsPolicy> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of hosts resolved so far
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Seeds the policy for a host without fetching
    pub async fn insert(&self, key: impl Into<String>, policy: RobotsPolicy) {
        self.entries.write().await.insert(key.into(), policy);
    }

    /// Resolves the policy for the host of `url`, fetching robots.txt on first use
    ///
    /// A fetch failure is logged and recorded as "no policy".
    pub async fn policy_for(&self, url: &Url) -> RobotsPolicy {
        let Some(key) = host_key(url) else {
            return None;
        };

        if let Some(policy) = self.get(&key).await {
            if let Some(cached) = &policy {
                tracing::debug!(
                    "Using cached robots.txt for {} (age {}s)",
                    key,
                    cached.age().num_seconds()
                );
            }
            return policy;
        }

        tracing::debug!("Fetching robots.txt for host: {}", key);
        let policy = match fetch_robots(&self.client, url).await {
            Ok(parsed) => Some(Arc::new(CachedRobots::new(parsed))),
            Err(e) => {
                tracing::warn!("Error fetching robots.txt: {}; treating {} as allow-all", e, key);
                None
            }
        };

        // Another caller may have resolved the same host meanwhile; first one wins
        self.entries
            .write()
            .await
            .entry(key)
            .or_insert(policy)
            .clone()
    }
}
