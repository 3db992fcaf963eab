//! Cooperative shutdown
//!
//! The run moves through three states, one way only:
//!
//! ```text
//! Running --stop signal / input exhausted--> Draining --in-flight == 0--> Closed
//! ```
//!
//! While draining, no new jobs are submitted but everything already
//! submitted runs to completion. Nothing in flight is cancelled.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{watch, Notify};

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Dispatcher submits freely
    Running,
    /// Submission stopped; submitted jobs are finishing
    Draining,
    /// Queue drained, workers exited, result stream closed
    Closed,
}

/// Jobs submitted but not yet resulted
///
/// `submitted - completed == in_flight` at all times.
#[derive(Debug, Default)]
pub struct InFlightCounter {
    submitted: AtomicUsize,
    completed: AtomicUsize,
    idle: Notify,
}

impl InFlightCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a job entering the queue
    pub fn submit(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a job whose result has been emitted
    pub fn complete(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        if self.in_flight() == 0 {
            self.idle.notify_waiters();
        }
    }

    /// Guard that records one completion when dropped
    ///
    /// The completion is recorded even if the holder unwinds from a panic.
    pub fn complete_on_drop(&self) -> CompletionGuard<'_> {
        CompletionGuard { counter: self }
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of jobs currently between submission and result
    pub fn in_flight(&self) -> usize {
        // Read completed first so a concurrent submit can only grow the result
        let completed = self.completed();
        self.submitted().saturating_sub(completed)
    }

    /// Waits until no job is in flight
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking, so a completion in between is not missed
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Completes one in-flight job when dropped
#[derive(Debug)]
pub struct CompletionGuard<'a> {
    counter: &'a InFlightCounter,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.counter.complete();
    }
}

/// Observes the stop signal and sequences the drain
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state: watch::Sender<Lifecycle>,
    in_flight: InFlightCounter,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Lifecycle::Running);
        Self {
            state,
            in_flight: InFlightCounter::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> Lifecycle {
        *self.state.borrow()
    }

    /// Whether submission must stop
    pub fn is_stopping(&self) -> bool {
        self.state() != Lifecycle::Running
    }

    pub fn in_flight(&self) -> &InFlightCounter {
        &self.in_flight
    }

    /// Running → Draining on an external stop signal
    ///
    /// Returns `true` if this call made the transition.
    pub fn request_stop(&self) -> bool {
        let stopped = self.begin_drain();
        if stopped {
            tracing::info!(
                "Shutdown signal received, stopping URL dispatch ({} jobs in flight)",
                self.in_flight.in_flight()
            );
        }
        stopped
    }

    /// Resolves once the run has left the Running state
    pub async fn stopped(&self) {
        let mut state = self.state.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = state.wait_for(|s| *s != Lifecycle::Running).await;
    }

    /// Enters Draining (if still Running) and waits for in-flight jobs to finish
    pub async fn drain(&self) {
        self.begin_drain();
        self.in_flight.wait_idle().await;
        tracing::debug!(
            "Drained: {} submitted, {} completed",
            self.in_flight.submitted(),
            self.in_flight.completed()
        );
    }

    /// Draining → Closed, once the queue is drained and workers have exited
    pub fn close(&self) {
        self.state.send_if_modified(|state| {
            if *state == Lifecycle::Draining && self.in_flight.in_flight() == 0 {
                *state = Lifecycle::Closed;
                true
            } else {
                false
            }
        });
    }

    fn begin_drain(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == Lifecycle::Running {
                *state = Lifecycle::Draining;
                true
            } else {
                false
            }
        })
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
