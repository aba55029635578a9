//! Persisted state for Wharf: app records, store directory layout, and
//! cross-process locking.
//!
//! One JSON file per app record, written atomically through a tempfile
//! rename with a parent directory fsync. The store is the single source
//! of truth the lifecycle engine and the worker both read.

pub mod app;
pub mod layout;
pub mod lock;

pub use app::{AppRecord, AppStatus, AppStore};
pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use lock::StoreLock;

use std::path::Path;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee
/// this. Calling `fsync()` on the parent directory makes the rename
/// durable on all filesystems and mount configurations.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("app record already exists: {0}")]
    AppExists(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_app_exists() {
        let e = StoreError::AppExists("nginx-1".to_owned());
        assert!(e.to_string().contains("nginx-1"));
    }

    #[test]
    fn error_display_version_mismatch() {
        let e = StoreError::VersionMismatch {
            expected: 1,
            found: 9,
        };
        let msg = e.to_string();
        assert!(msg.contains('1'));
        assert!(msg.contains('9'));
    }
}
