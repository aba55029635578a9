//! Event dispatch and job coordination for Wharf.
//!
//! This crate bridges lifecycle intent to out-of-process execution: a
//! durable file-backed job queue with atomic claim semantics, the
//! `EventDispatcher` offering a synchronous-looking bounded wait over a
//! polling loop, and cron-based scheduling of repeatable jobs on the
//! same queue substrate.

pub mod dispatch;
pub mod event;
pub mod queue;
pub mod schedule;

pub use dispatch::{DispatcherConfig, EventDispatcher, EventOutcome};
pub use event::{AppCommand, EventKind, SystemEvent};
pub use queue::{JobOutcome, JobQueue, JobRecord, JobStatus};
pub use schedule::ScheduleId;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },
}
