//! Job dispatch
//!
//! Turns the operator's URL list into jobs: resolves each URL's host policy
//! through the robots cache, counts the job as in flight, and enqueues it.
//! Submission stops as soon as a stop signal is observed.

use crate::crawler::shutdown::ShutdownCoordinator;
use crate::crawler::worker::Job;
use crate::robots::RobotsCache;
use crate::url::parse_target;
use std::sync::Arc;
use tokio::sync::mpsc;

/// What happened to each input URL during dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Jobs enqueued; each yields exactly one result
    pub submitted: usize,

    /// URLs rejected before dispatch (no job, no result)
    pub skipped: usize,

    /// URLs never considered because the run was stopped
    pub dropped: usize,
}

/// Feeds the job queue from the URL list
#[derive(Debug, Clone)]
pub struct Dispatcher {
    robots: Arc<RobotsCache>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Dispatcher {
    pub fn new(robots: Arc<RobotsCache>, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self { robots, shutdown }
    }

    /// Submits one job per dispatchable URL
    ///
    /// Consumes the queue's sender; the queue closes when this returns.
    pub async fn dispatch(&self, urls: Vec<String>, jobs: mpsc::Sender<Job>) -> DispatchReport {
        let total = urls.len();
        let mut report = DispatchReport::default();

        for (index, raw) in urls.into_iter().enumerate() {
            if self.shutdown.is_stopping() {
                report.dropped = total - index;
                break;
            }

            let target = raw.trim();
            let Some(url) = parse_target(target) else {
                tracing::warn!("Error parsing URL: {}; skipping", target);
                report.skipped += 1;
                continue;
            };

            // robots.txt and queue space may both take a while; a stop wins either race
            let robots = tokio::select! {
                biased;
                _ = self.shutdown.stopped() => None,
                policy = self.robots.policy_for(&url) => Some(policy),
            };
            let Some(robots) = robots else {
                report.dropped = total - index;
                break;
            };

            let permit = tokio::select! {
                biased;
                _ = self.shutdown.stopped() => None,
                permit = jobs.reserve() => permit.ok(),
            };
            let Some(permit) = permit else {
                if !self.shutdown.is_stopping() {
                    tracing::warn!("Job queue closed; stopping dispatch");
                }
                report.dropped = total - index;
                break;
            };

            self.shutdown.in_flight().submit();
            permit.send(Job {
                url: target.to_string(),
                robots,
            });
            report.submitted += 1;
        }

        if report.dropped > 0 {
            tracing::info!(
                "Dispatch stopped early: {} URLs not submitted",
                report.dropped
            );
        }
        tracing::debug!(
            "Dispatch finished: {} submitted, {} skipped, {} dropped",
            report.submitted,
            report.skipped,
            report.dropped
        );

        report
    }
}
