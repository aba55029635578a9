//! Repeatable jobs on a cron cadence, sharing the queue substrate.

use crate::event::SystemEvent;
use crate::queue::JobQueue;
use crate::EventError;
use chrono::{DateTime, Utc};
use croner::Cron;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

pub type ScheduleId = u64;

struct Registration {
    id: ScheduleId,
    event: SystemEvent,
    cron: Cron,
    next: DateTime<Utc>,
}

struct SchedulerState {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    shutdown: AtomicBool,
}

/// Background thread that enqueues a fresh copy of each registered event
/// at every cron occurrence.
pub(crate) struct Scheduler {
    state: Arc<SchedulerState>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub(crate) fn start(queue: JobQueue, tick: Duration) -> Self {
        let state = Arc::new(SchedulerState {
            registrations: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            shutdown: AtomicBool::new(false),
        });

        let thread_state = Arc::clone(&state);
        let handle = std::thread::spawn(move || {
            while !thread_state.shutdown.load(Ordering::SeqCst) {
                let now = Utc::now();
                {
                    let mut registrations = thread_state
                        .registrations
                        .lock()
                        .unwrap_or_else(|e| e.into_inner());
                    for registration in registrations.iter_mut() {
                        if registration.next > now {
                            continue;
                        }
                        if let Err(e) = queue.enqueue(&registration.event) {
                            warn!(
                                "scheduled job {} failed to enqueue: {e}",
                                registration.id
                            );
                        }
                        match registration.cron.find_next_occurrence(&now, false) {
                            Ok(next) => registration.next = next,
                            Err(e) => {
                                warn!(
                                    "scheduled job {} has no next occurrence: {e}",
                                    registration.id
                                );
                                registration.next = DateTime::<Utc>::MAX_UTC;
                            }
                        }
                    }
                }
                std::thread::sleep(tick);
            }
        });

        Self {
            state,
            handle: Some(handle),
        }
    }

    pub(crate) fn register(
        &self,
        event: SystemEvent,
        expression: &str,
    ) -> Result<ScheduleId, EventError> {
        let cron = Cron::new(expression)
            .with_seconds_optional()
            .parse()
            .map_err(|e| EventError::InvalidCron {
                expression: expression.to_owned(),
                reason: e.to_string(),
            })?;
        let next = cron
            .find_next_occurrence(&Utc::now(), false)
            .map_err(|e| EventError::InvalidCron {
                expression: expression.to_owned(),
                reason: e.to_string(),
            })?;

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        let mut registrations = self
            .state
            .registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        registrations.push(Registration {
            id,
            event,
            cron,
            next,
        });
        debug!("registered schedule {id} ({expression})");
        Ok(id)
    }

    pub(crate) fn clear(&self) {
        let mut registrations = self
            .state
            .registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        registrations.clear();
    }

    pub(crate) fn registration_count(&self) -> usize {
        self.state
            .registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub(crate) fn stop(&mut self) {
        self.state.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AppCommand;

    fn setup() -> (tempfile::TempDir, JobQueue, Scheduler) {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(dir.path().join("jobs"));
        queue.initialize().unwrap();
        let scheduler = Scheduler::start(queue.clone(), Duration::from_millis(50));
        (dir, queue, scheduler)
    }

    #[test]
    fn register_rejects_invalid_expression() {
        let (_dir, _queue, scheduler) = setup();
        let result = scheduler.register(
            SystemEvent::app(AppCommand::GenerateEnv, "nginx-1"),
            "not a cron",
        );
        assert!(matches!(result, Err(EventError::InvalidCron { .. })));
    }

    #[test]
    fn register_assigns_increasing_ids() {
        let (_dir, _queue, scheduler) = setup();
        let a = scheduler
            .register(SystemEvent::app(AppCommand::GenerateEnv, "a-1"), "0 3 * * *")
            .unwrap();
        let b = scheduler
            .register(SystemEvent::app(AppCommand::GenerateEnv, "b-1"), "0 3 * * *")
            .unwrap();
        assert!(b > a);
        assert_eq!(scheduler.registration_count(), 2);
    }

    #[test]
    fn clear_removes_registrations() {
        let (_dir, _queue, scheduler) = setup();
        scheduler
            .register(SystemEvent::app(AppCommand::GenerateEnv, "a-1"), "0 3 * * *")
            .unwrap();
        scheduler.clear();
        assert_eq!(scheduler.registration_count(), 0);
    }

    #[test]
    fn due_registration_enqueues_job() {
        let (_dir, queue, scheduler) = setup();
        // Six-field expression: fires every second.
        scheduler
            .register(
                SystemEvent::app(AppCommand::GenerateEnv, "nginx-1"),
                "* * * * * *",
            )
            .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if queue.pending_count().unwrap() > 0 {
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "scheduled job never fired"
            );
            std::thread::sleep(Duration::from_millis(20));
        }

        let claimed = queue.claim_next().unwrap().unwrap();
        assert_eq!(claimed.event.command, AppCommand::GenerateEnv);
    }

    #[test]
    fn stop_joins_cleanly() {
        let (_dir, _queue, mut scheduler) = setup();
        scheduler.stop();
        // A second stop is a no-op.
        scheduler.stop();
    }
}
