//! The request/response bridge between lifecycle intent and worker
//! execution.
//!
//! `EventDispatcher` is an explicit, constructor-injected instance with
//! its own lifecycle (`new`/`close`); multiple instances can coexist in
//! tests without shared global state.

use crate::event::SystemEvent;
use crate::queue::{JobQueue, JobOutcome};
use crate::schedule::{ScheduleId, Scheduler};
use crate::EventError;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;
use wharf_schema::JobId;

/// Polling cadence and operation budgets. Explicit parameters rather
/// than hard-coded constants so tests can run on millisecond scales.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub poll_interval: Duration,
    /// Budget for a typical container operation.
    pub timeout: Duration,
    /// Budget for an update that also performs a backup.
    pub backup_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(5 * 60),
            backup_timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Uniform result shape for every dispatched operation: worker-reported
/// errors, timeouts, and dispatch-layer failures all normalize to
/// `success: false` with a reason in `stdout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub success: bool,
    pub stdout: String,
}

impl EventOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: reason.into(),
        }
    }
}

impl From<JobOutcome> for EventOutcome {
    fn from(outcome: JobOutcome) -> Self {
        Self {
            success: outcome.success,
            stdout: outcome.stdout,
        }
    }
}

pub struct EventDispatcher {
    queue: JobQueue,
    config: DispatcherConfig,
    scheduler: Scheduler,
}

impl EventDispatcher {
    pub fn new(
        jobs_dir: impl Into<PathBuf>,
        config: DispatcherConfig,
    ) -> Result<Self, EventError> {
        let queue = JobQueue::new(jobs_dir);
        queue.initialize()?;
        let scheduler = Scheduler::start(queue.clone(), config.poll_interval);
        Ok(Self {
            queue,
            config,
            scheduler,
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// The operation budget for an event, honoring the extended backup
    /// window.
    pub fn timeout_for(&self, event: &SystemEvent) -> Duration {
        if event.perform_backup == Some(true) {
            self.config.backup_timeout
        } else {
            self.config.timeout
        }
    }

    /// Enqueue and return immediately; nothing is executed in-process.
    pub fn dispatch_event(&self, event: &SystemEvent) -> Result<JobId, EventError> {
        self.queue.enqueue(event)
    }

    /// Enqueue, then poll until the worker reports a terminal status or
    /// the job's age exceeds `timeout`.
    ///
    /// Timeout is a result, not an exception: the job is dropped from the
    /// pending set and the outcome reports `success: false`, so callers
    /// branch uniformly on `success`.
    pub fn dispatch_event_async(&self, event: &SystemEvent, timeout: Duration) -> EventOutcome {
        let id = match self.queue.enqueue(event) {
            Ok(id) => id,
            Err(e) => return EventOutcome::failure(format!("failed to dispatch event: {e}")),
        };
        debug!("dispatched {} for {} as {id}", event.command, event.appid);

        let start = Instant::now();
        loop {
            match self.queue.take_result(&id) {
                Ok(Some(outcome)) => return outcome.into(),
                Ok(None) => {}
                Err(e) => {
                    return EventOutcome::failure(format!("failed to observe job status: {e}"));
                }
            }

            if start.elapsed() >= timeout {
                let _ = self.queue.drop_pending(&id);
                return EventOutcome::failure(format!(
                    "operation timed out after {} seconds",
                    timeout.as_secs_f64()
                ));
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }

    /// Register a repeatable job on a cron cadence.
    pub fn schedule_event(
        &self,
        event: SystemEvent,
        cron_expression: &str,
    ) -> Result<ScheduleId, EventError> {
        self.scheduler.register(event, cron_expression)
    }

    /// Drop all repeatable registrations and purge the queue.
    pub fn clear(&self) -> Result<(), EventError> {
        self.scheduler.clear();
        self.queue.purge()
    }

    /// Stop the scheduler thread. Called automatically on drop.
    pub fn close(&mut self) {
        self.scheduler.stop();
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}
