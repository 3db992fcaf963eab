//! Crawler module: the concurrent fetch engine
//!
//! This module contains the core fetching logic, including:
//! - A process-wide rate limiter
//! - HTTP fetching with outcome classification
//! - A fixed-size worker pool fed by a dispatcher
//! - Cooperative shutdown (signal → drain → close)
//! - Overall crawl coordination

mod coordinator;
mod dispatcher;
mod fetcher;
mod rate_limiter;
mod shutdown;
mod worker;

pub use coordinator::{CrawlHandle, Coordinator};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use fetcher::{build_http_client, classify_transport_error, fetch_url, FetchResult};
pub use rate_limiter::RateLimiter;
pub use shutdown::{CompletionGuard, InFlightCounter, Lifecycle, ShutdownCoordinator};
pub use worker::{process_job, Job, WorkerContext, WorkerPool};

use crate::output::{report_results, CrawlStatistics};
use crate::CrawlError;
use std::io::Write;

/// Everything a finished crawl reports
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub dispatch: DispatchReport,
    pub statistics: CrawlStatistics,
}

/// Runs a complete crawl, rendering each result to `out` as it arrives
///
/// This is the main entry point for a crawl. It will:
/// 1. Start the coordinator in the background
/// 2. Write every result to `out` until the result stream closes
/// 3. Wait for the coordinator to finish its drain
///
/// Stop the run early through [`Coordinator::shutdown`] before calling this.
///
/// # Example
///
/// ```no_run
/// use fourbot::config::Config;
/// use fourbot::crawler::{crawl, Coordinator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = Coordinator::new(Config::default())?;
/// let urls = vec!["https://example.com/".to_string()];
/// let outcome = crawl(coordinator, urls, &mut std::io::stdout()).await?;
/// println!("{} results", outcome.statistics.total());
/// # Ok(())
/// # }
/// ```
pub async fn crawl<W: Write>(
    coordinator: Coordinator,
    urls: Vec<String>,
    out: &mut W,
) -> Result<CrawlOutcome, CrawlError> {
    let options = coordinator.config().output.clone();
    let mut handle = coordinator.spawn(urls);

    let statistics = report_results(&mut handle.results, out, &options).await;
    let dispatch = handle.task.await??;

    Ok(CrawlOutcome {
        dispatch,
        statistics: statistics?,
    })
}
