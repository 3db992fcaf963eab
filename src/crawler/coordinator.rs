//! Crawler coordinator - wires the fetch engine together
//!
//! The coordinator owns the shared pieces (HTTP client, rate limiter, robots
//! cache, shutdown lifecycle) and runs one crawl:
//!
//! 1. Start the worker pool on a bounded job queue
//! 2. Dispatch the URL list, stopping early on a stop signal
//! 3. Close the job queue and drain in-flight jobs
//! 4. Join the workers, which closes the result stream
//! 5. Mark the run Closed

use crate::config::{validate, Config};
use crate::crawler::dispatcher::{DispatchReport, Dispatcher};
use crate::crawler::fetcher::{build_http_client, FetchResult};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::shutdown::ShutdownCoordinator;
use crate::crawler::worker::{WorkerContext, WorkerPool};
use crate::robots::RobotsCache;
use crate::CrawlError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A crawl running in the background
///
/// Read `results` until it yields `None`, then await `task` for the
/// dispatch report. The stream ends only after every submitted job has
/// produced its result.
#[derive(Debug)]
pub struct CrawlHandle {
    pub results: mpsc::UnboundedReceiver<FetchResult>,
    pub task: JoinHandle<Result<DispatchReport, CrawlError>>,
}

/// Main crawler coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    limiter: Arc<RateLimiter>,
    robots: Arc<RobotsCache>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client build failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;

        let client = build_http_client(&config.http)?;
        let limiter = Arc::new(RateLimiter::new(config.crawler.rate_limit()));
        let robots = Arc::new(RobotsCache::new(client.clone()));

        Ok(Self {
            config: Arc::new(config),
            client,
            limiter,
            robots,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle used to signal a stop and observe the lifecycle
    pub fn shutdown(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.shutdown)
    }

    /// The per-host robots.txt cache used by this run
    pub fn robots(&self) -> Arc<RobotsCache> {
        Arc::clone(&self.robots)
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Starts the crawl on the current runtime and returns its handle
    pub fn spawn(self, urls: Vec<String>) -> CrawlHandle {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(urls, results_tx));
        CrawlHandle {
            results: results_rx,
            task,
        }
    }

    /// Runs the crawl to completion, sending every result into `results`
    pub async fn run(
        self,
        urls: Vec<String>,
        results: mpsc::UnboundedSender<FetchResult>,
    ) -> Result<DispatchReport, CrawlError> {
        let workers = self.config.crawler.workers as usize;
        tracing::info!(
            "Starting crawl of {} URLs with {} workers ({}ms between fetches)",
            urls.len(),
            workers,
            self.config.crawler.rate_limit_ms
        );

        let (jobs_tx, jobs_rx) = mpsc::channel(self.config.crawler.queue_capacity);
        let context = WorkerContext {
            client: self.client.clone(),
            limiter: Arc::clone(&self.limiter),
            shutdown: Arc::clone(&self.shutdown),
            user_agent: Arc::from(self.config.http.user_agent.as_str()),
        };
        // The pool holds the only result senders from here on
        let pool = WorkerPool::start(workers, jobs_rx, results, context);

        let dispatcher = Dispatcher::new(Arc::clone(&self.robots), Arc::clone(&self.shutdown));
        let report = dispatcher.dispatch(urls, jobs_tx).await;

        if !self.shutdown.is_stopping() {
            tracing::info!("All URLs dispatched, waiting for ongoing tasks to complete");
        }
        pool.finish(&self.shutdown).await?;
        self.shutdown.close();

        tracing::info!(
            "Crawl finished: {} submitted, {} skipped, {} dropped, {} robots.txt hosts",
            report.submitted,
            report.skipped,
            report.dropped,
            self.robots.len().await
        );

        Ok(report)
    }
}
