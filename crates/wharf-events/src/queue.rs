//! File-backed job queue with atomic claim semantics.
//!
//! A job lives as one JSON file that moves through `pending/`,
//! `running/`, and `done/`. Claiming renames the file into `running/`, so
//! concurrent workers can race on the same queue and exactly one wins.

use crate::event::SystemEvent;
use crate::EventError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use wharf_schema::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Waiting,
    Running,
    Success,
    Error,
}

/// One dispatched unit of work and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub event: SystemEvent,
    pub created_at: String,
    pub status: JobStatus,
    #[serde(default)]
    pub stdout: String,
}

/// Terminal outcome of a job as observed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub success: bool,
    pub stdout: String,
}

#[derive(Debug, Clone)]
pub struct JobQueue {
    jobs_dir: PathBuf,
}

impl JobQueue {
    pub fn new(jobs_dir: impl Into<PathBuf>) -> Self {
        Self {
            jobs_dir: jobs_dir.into(),
        }
    }

    pub fn initialize(&self) -> Result<(), EventError> {
        fs::create_dir_all(self.pending_dir())?;
        fs::create_dir_all(self.running_dir())?;
        fs::create_dir_all(self.done_dir())?;
        Ok(())
    }

    fn pending_dir(&self) -> PathBuf {
        self.jobs_dir.join("pending")
    }

    fn running_dir(&self) -> PathBuf {
        self.jobs_dir.join("running")
    }

    fn done_dir(&self) -> PathBuf {
        self.jobs_dir.join("done")
    }

    fn file_name(id: &JobId) -> String {
        format!("{id}.json")
    }

    /// Job ids sort lexicographically in dispatch order thanks to the
    /// timestamp prefix.
    fn generate_id(event: &SystemEvent) -> JobId {
        JobId::new(format!(
            "{}-{}-{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S%9f"),
            event.command,
            &blake3::hash(event.appid.as_bytes()).to_hex()[..8]
        ))
    }

    fn write_record(&self, dir: &Path, record: &JobRecord) -> Result<(), EventError> {
        let content = serde_json::to_string_pretty(record)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(dir.join(Self::file_name(&record.id)))
            .map_err(|e| EventError::Io(e.error))?;
        Ok(())
    }

    /// Append a new waiting job and return its id.
    pub fn enqueue(&self, event: &SystemEvent) -> Result<JobId, EventError> {
        self.initialize()?;
        let record = JobRecord {
            id: Self::generate_id(event),
            event: event.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            status: JobStatus::Waiting,
            stdout: String::new(),
        };
        self.write_record(&self.pending_dir(), &record)?;
        debug!("enqueued job {} ({})", record.id, record.event.command);
        Ok(record.id)
    }

    /// Atomically claim the oldest pending job, if any.
    pub fn claim_next(&self) -> Result<Option<JobRecord>, EventError> {
        let pending = self.pending_dir();
        if !pending.exists() {
            return Ok(None);
        }

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&pending)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();

        for name in names {
            let claimed = self.running_dir().join(&name);
            match fs::rename(pending.join(&name), &claimed) {
                Ok(()) => {}
                // Another worker won the claim; try the next job.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }

            let content = fs::read_to_string(&claimed)?;
            match serde_json::from_str::<JobRecord>(&content) {
                Ok(mut record) => {
                    record.status = JobStatus::Running;
                    self.write_record(&self.running_dir(), &record)?;
                    return Ok(Some(record));
                }
                Err(e) => {
                    warn!("discarding corrupt job file {name}: {e}");
                    let _ = fs::remove_file(&claimed);
                }
            }
        }
        Ok(None)
    }

    /// Publish a claimed job's terminal status and clear its running marker.
    pub fn complete(
        &self,
        mut record: JobRecord,
        success: bool,
        stdout: impl Into<String>,
    ) -> Result<(), EventError> {
        record.status = if success {
            JobStatus::Success
        } else {
            JobStatus::Error
        };
        record.stdout = stdout.into();
        self.write_record(&self.done_dir(), &record)?;
        let _ = fs::remove_file(self.running_dir().join(Self::file_name(&record.id)));
        Ok(())
    }

    /// Consume a terminal status if the worker has reported one.
    ///
    /// The job file is removed on first observation, so finalization for
    /// a given job happens at most once.
    pub fn take_result(&self, id: &JobId) -> Result<Option<JobOutcome>, EventError> {
        let path = self.done_dir().join(Self::file_name(id));
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let record: JobRecord = serde_json::from_str(&content)?;
        fs::remove_file(&path)?;
        Ok(Some(JobOutcome {
            success: record.status == JobStatus::Success,
            stdout: record.stdout,
        }))
    }

    /// Drop a job from the pending set (timeout path). Returns whether it
    /// was still pending.
    pub fn drop_pending(&self, id: &JobId) -> Result<bool, EventError> {
        let path = self.pending_dir().join(Self::file_name(id));
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    pub fn pending_count(&self) -> Result<usize, EventError> {
        let dir = self.pending_dir();
        if !dir.exists() {
            return Ok(0);
        }
        Ok(fs::read_dir(&dir)?.count())
    }

    /// Remove every job file in every state.
    pub fn purge(&self) -> Result<(), EventError> {
        for dir in [self.pending_dir(), self.running_dir(), self.done_dir()] {
            if !dir.exists() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::remove_file(entry.path())?;
                }
            }
        }
        Ok(())
    }
}
