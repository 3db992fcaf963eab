use serde::Deserialize;
use std::time::Duration;

/// Agent identity sent with every request and matched against robots.txt
pub const DEFAULT_USER_AGENT: &str = "FourBot";

/// Main configuration structure for FourBot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Worker pool and rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of long-lived fetch workers
    pub workers: u32,

    /// Minimum interval between two fetch starts, across all workers (milliseconds)
    pub rate_limit_ms: u64,

    /// Capacity of the job queue between the dispatcher and the workers
    pub queue_capacity: usize,
}

impl CrawlerConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            rate_limit_ms: 100,
            queue_capacity: 16,
        }
    }
}

/// HTTP client configuration shared by page and robots.txt fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header value and robots.txt agent identity
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Redirect count at which the fetch fails
    ///
    /// A chain of `max_redirects - 1` redirects is followed; one more is
    /// `too-many-redirects`.
    pub max_redirects: usize,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Print the body after each "Fetched URL" line
    pub show_body: bool,

    /// Print run statistics once the result stream closes
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_body: true,
            summary: false,
        }
    }
}
