use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;
use wharf_schema::{AppId, StoreId};

/// Lifecycle status of one app instance.
///
/// `Missing` is never written to disk: an app without a record file is
/// missing, and a failed install deletes the record rather than parking
/// it in this state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Missing,
    Installing,
    Starting,
    Running,
    Stopping,
    Stopped,
    Updating,
    Uninstalling,
    Resetting,
    Restarting,
    BackingUp,
    Restoring,
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppStatus::Missing => write!(f, "missing"),
            AppStatus::Installing => write!(f, "installing"),
            AppStatus::Starting => write!(f, "starting"),
            AppStatus::Running => write!(f, "running"),
            AppStatus::Stopping => write!(f, "stopping"),
            AppStatus::Stopped => write!(f, "stopped"),
            AppStatus::Updating => write!(f, "updating"),
            AppStatus::Uninstalling => write!(f, "uninstalling"),
            AppStatus::Resetting => write!(f, "resetting"),
            AppStatus::Restarting => write!(f, "restarting"),
            AppStatus::BackingUp => write!(f, "backing_up"),
            AppStatus::Restoring => write!(f, "restoring"),
        }
    }
}

/// One installed-or-attempted app instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppRecord {
    pub id: AppId,
    pub app_name: String,
    pub store_id: StoreId,
    pub status: AppStatus,
    /// Env-variable-keyed form answers; opaque to the store.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    /// Installed catalog revision.
    pub version: u32,
    #[serde(default)]
    pub exposed: bool,
    #[serde(default)]
    pub exposed_local: bool,
    #[serde(default)]
    pub open_port: bool,
    #[serde(default)]
    pub enable_auth: bool,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub is_visible_on_guest_dashboard: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Repository of app records, one JSON file per app id.
///
/// Each call is atomic on its own: writes go through a tempfile rename
/// with a parent directory fsync. There is no optimistic locking on the
/// status field; the last writer wins.
pub struct AppStore {
    layout: StoreLayout,
}

impl AppStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    fn record_path(&self, app_id: &AppId) -> std::path::PathBuf {
        self.layout.apps_dir().join(format!("{app_id}.json"))
    }

    fn write(&self, record: &AppRecord) -> Result<(), StoreError> {
        let dir = self.layout.apps_dir();
        let content = serde_json::to_string_pretty(record)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.record_path(&record.id))
            .map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;
        Ok(())
    }

    /// Persist a new record. Fails if one already exists for the id.
    pub fn create(&self, record: &AppRecord) -> Result<(), StoreError> {
        if self.record_path(&record.id).exists() {
            return Err(StoreError::AppExists(record.id.to_string()));
        }
        self.write(record)
    }

    pub fn get(&self, app_id: &AppId) -> Result<Option<AppRecord>, StoreError> {
        let path = self.record_path(app_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Apply a patch to an existing record and persist it.
    ///
    /// Returns `Ok(None)` when no record exists; a finalization callback
    /// racing a concurrent uninstall must be a no-op, not an error.
    pub fn update(
        &self,
        app_id: &AppId,
        patch: impl FnOnce(&mut AppRecord),
    ) -> Result<Option<AppRecord>, StoreError> {
        let Some(mut record) = self.get(app_id)? else {
            return Ok(None);
        };
        patch(&mut record);
        record.updated_at = chrono::Utc::now().to_rfc3339();
        self.write(&record)?;
        Ok(Some(record))
    }

    pub fn update_status(
        &self,
        app_id: &AppId,
        status: AppStatus,
    ) -> Result<Option<AppRecord>, StoreError> {
        self.update(app_id, |record| record.status = status)
    }

    /// Remove the record. Returns whether one existed.
    pub fn delete(&self, app_id: &AppId) -> Result<bool, StoreError> {
        let path = self.record_path(app_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        fsync_dir(&self.layout.apps_dir())?;
        Ok(true)
    }

    pub fn list(&self) -> Result<Vec<AppRecord>, StoreError> {
        let dir = self.layout.apps_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                let parsed = fs::read_to_string(&path)
                    .map_err(StoreError::Io)
                    .and_then(|content| {
                        serde_json::from_str::<AppRecord>(&content)
                            .map_err(StoreError::Serialization)
                    });
                match parsed {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!("skipping corrupted app record {}: {e}", path.display());
                    }
                }
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    /// All exposed apps claiming the given domain.
    pub fn get_by_domain(&self, domain: &str) -> Result<Vec<AppRecord>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| r.exposed && r.domain.as_deref() == Some(domain))
            .collect())
    }
}
