use crate::layout::StoreLayout;
use crate::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};

/// Exclusive claim on a store's worker slot.
///
/// Exactly one worker may mutate a store's compose projects at a time;
/// holding this lock is what makes the job queue's single execution
/// slot hold across processes. The lock is advisory, lives at the store
/// root, and is released when the guard (or the process holding it)
/// goes away, since the OS drops file locks with the handle.
pub struct StoreLock {
    _file: File,
}

impl StoreLock {
    /// Block until this process holds the store's worker slot.
    pub fn acquire(layout: &StoreLayout) -> Result<Self, StoreError> {
        let file = Self::open(layout)?;
        file.lock_exclusive()?;
        Ok(Self { _file: file })
    }

    /// Claim the worker slot if it is free; `None` means another worker
    /// already serves this store.
    pub fn try_acquire(layout: &StoreLayout) -> Result<Option<Self>, StoreError> {
        let file = Self::open(layout)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { _file: file })),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn open(layout: &StoreLayout) -> Result<File, StoreError> {
        let path = layout.lock_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?)
    }
}
