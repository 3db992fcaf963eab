//! Process-wide fetch rate limiting
//!
//! A single [`RateLimiter`] is shared by every worker, so the aggregate rate
//! of fetch starts is bounded by one grant per interval no matter how many
//! workers are running.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Ticking gate issuing one grant per interval
///
/// Waiters queue on a fair mutex and are served in arrival order. The first
/// grant is immediate; each later grant comes at least one interval after
/// the previous one.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_grant: Mutex<Option<Instant>>,
    grants: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter issuing at most one grant per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_grant: Mutex::new(None),
            grants: AtomicU64::new(0),
        }
    }

    /// Creates a limiter from a requests-per-second ceiling
    pub fn per_second(requests: u32) -> Self {
        Self::new(Duration::from_secs(1) / requests.max(1))
    }

    /// Minimum spacing between two grants
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total grants issued so far
    pub fn grants(&self) -> u64 {
        self.grants.load(Ordering::Relaxed)
    }

    /// Blocks until the caller may start a fetch
    pub async fn acquire(&self) {
        // Held across the sleep: later callers wait their turn behind us
        let mut next_grant = self.next_grant.lock().await;

        let now = Instant::now();
        let grant_at = next_grant.map_or(now, |at| at.max(now));
        if grant_at > now {
            sleep_until(grant_at).await;
        }

        *next_grant = Some(grant_at + self.interval);
        self.grants.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
