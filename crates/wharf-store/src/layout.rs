use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Current store format version. Incremented on incompatible layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Directory layout for the Wharf state store.
///
/// Holds app records, the job queue, and per-app generated artifacts
/// (compose document and env file). Subdirectories are created lazily on
/// [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn apps_dir(&self) -> PathBuf {
        self.root.join("apps")
    }

    #[inline]
    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    #[inline]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Per-app directory holding the generated compose and env artifacts.
    #[inline]
    pub fn app_data_dir(&self, app_id: &str) -> PathBuf {
        self.data_dir().join(app_id)
    }

    /// The generated compose document, fully overwritten on every
    /// regeneration.
    #[inline]
    pub fn compose_path(&self, app_id: &str) -> PathBuf {
        self.app_data_dir(app_id).join("docker-compose.yml")
    }

    #[inline]
    pub fn env_path(&self, app_id: &str) -> PathBuf {
        self.app_data_dir(app_id).join("app.env")
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".lock")
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.apps_dir())?;
        fs::create_dir_all(self.jobs_dir())?;
        fs::create_dir_all(self.data_dir())?;

        let version_path = self.root.join(VERSION_FILE);
        if version_path.exists() {
            self.verify_version()?;
        } else {
            let ver = StoreVersion {
                format_version: STORE_FORMAT_VERSION,
            };
            let content = serde_json::to_string_pretty(&ver)?;
            let mut tmp = NamedTempFile::new_in(&self.root)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&version_path)
                .map_err(|e| StoreError::Io(e.error))?;
            crate::fsync_dir(&self.root)?;
        }

        Ok(())
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let version_path = self.root.join(VERSION_FILE);
        let content = fs::read_to_string(&version_path)?;
        let ver: StoreVersion = serde_json::from_str(&content)?;

        if ver.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: ver.format_version,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_are_correct() {
        let layout = StoreLayout::new("/var/lib/wharf");
        assert_eq!(layout.apps_dir(), PathBuf::from("/var/lib/wharf/apps"));
        assert_eq!(layout.jobs_dir(), PathBuf::from("/var/lib/wharf/jobs"));
        assert_eq!(
            layout.compose_path("nginx-1"),
            PathBuf::from("/var/lib/wharf/data/nginx-1/docker-compose.yml")
        );
        assert_eq!(
            layout.env_path("nginx-1"),
            PathBuf::from("/var/lib/wharf/data/nginx-1/app.env")
        );
    }

    #[test]
    fn initialize_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();

        assert!(layout.apps_dir().is_dir());
        assert!(layout.jobs_dir().is_dir());
        assert!(layout.data_dir().is_dir());
    }

    #[test]
    fn initialize_writes_version() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        layout.verify_version().unwrap();
    }

    #[test]
    fn initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        layout.initialize().unwrap();
        layout.verify_version().unwrap();
    }

    #[test]
    fn version_mismatch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path());
        layout.initialize().unwrap();
        fs::write(dir.path().join("version"), r#"{"format_version": 99}"#).unwrap();
        assert!(matches!(
            layout.verify_version().unwrap_err(),
            StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: 99
            }
        ));
    }
}
