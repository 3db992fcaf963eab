//! Fixed-size worker pool
//!
//! Workers share one job queue and one result sink. For every job a worker
//! waits on the global rate limiter, checks robots.txt, fetches, and emits
//! exactly one [`FetchResult`]. Workers only exit once the queue is closed
//! and empty.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::shutdown::ShutdownCoordinator;
use crate::robots::{is_allowed, RobotsPolicy};
use crate::url::{parse_target, request_path};
use crate::{CrawlError, FetchError};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// A single URL queued for fetching, with its host's robots.txt policy
#[derive(Debug, Clone)]
pub struct Job {
    pub url: String,
    pub robots: RobotsPolicy,
}

/// Shared, read-mostly state every worker needs
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub client: Client,
    pub limiter: Arc<RateLimiter>,
    pub shutdown: Arc<ShutdownCoordinator>,
    pub user_agent: Arc<str>,
}

/// Handles to the running workers
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `count` workers consuming `jobs` and producing into `results`
    ///
    /// The pool takes ownership of `results`; the result stream closes once
    /// every worker has exited.
    pub fn start(
        count: usize,
        jobs: mpsc::Receiver<Job>,
        results: mpsc::UnboundedSender<FetchResult>,
        context: WorkerContext,
    ) -> Self {
        let queue = Arc::new(Mutex::new(jobs));

        let handles = (0..count)
            .map(|id| {
                let queue = Arc::clone(&queue);
                let results = results.clone();
                let context = context.clone();
                tokio::spawn(run_worker(id, queue, results, context))
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit
    pub async fn join(self) -> Result<(), CrawlError> {
        let mut first_error = None;
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Drains in-flight jobs and waits for every worker to exit
    ///
    /// Returns as soon as the pool has exited, even if jobs are still
    /// counted in flight because no worker survived to run them.
    pub async fn finish(self, shutdown: &ShutdownCoordinator) -> Result<(), CrawlError> {
        let joined = self.join();
        tokio::pin!(joined);

        tokio::select! {
            _ = shutdown.drain() => joined.await,
            result = &mut joined => {
                result?;
                shutdown.drain().await;
                Ok(())
            }
        }
    }
}

async fn run_worker(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::UnboundedSender<FetchResult>,
    context: WorkerContext,
) {
    tracing::info!("Worker {} started", id);

    loop {
        // Lock only for the receive; processing happens without it
        let job = queue.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        // Dropped after the result is sent, or while unwinding from a panic
        let _completion = context.shutdown.in_flight().complete_on_drop();

        tracing::debug!("Worker {} processing URL: {}", id, job.url);
        let result = process_job(&context, job).await;

        if let Err(e) = &result.outcome {
            tracing::debug!("Worker {} finished {} with {}", id, result.url, e.kind());
        }
        if results.send(result).is_err() {
            tracing::warn!("Result stream closed; worker {} dropped a result", id);
        }
    }

    tracing::info!("Worker {} finished", id);
}

/// Runs one job through rate limiter, robots.txt check and fetch
pub async fn process_job(context: &WorkerContext, job: Job) -> FetchResult {
    context.limiter.acquire().await;

    let Some(target) = parse_target(&job.url) else {
        return FetchResult::failure(&job.url, FetchError::InvalidUrl(job.url.clone()));
    };

    if !is_allowed(
        job.robots.as_deref(),
        request_path(&target),
        &context.user_agent,
    ) {
        tracing::info!("URL {} disallowed by robots.txt", job.url);
        return FetchResult::failure(job.url, FetchError::RobotsDisallowed);
    }

    fetch_url(&context.client, &job.url).await
}
