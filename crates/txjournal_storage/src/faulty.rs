//! Fault injection wrapper.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Faults {
    fail_appends: AtomicBool,
    fail_flush: AtomicBool,
    fail_truncate: AtomicBool,
    appends: AtomicUsize,
}

/// Shared switchboard for a [`FaultyBackend`].
///
/// The backend itself is usually moved into a journal writer, so tests
/// keep a cloned handle to flip faults on and off from the outside.
#[derive(Debug, Clone, Default)]
pub struct FaultHandle {
    faults: Arc<Faults>,
}

impl FaultHandle {
    /// Makes every subsequent append fail until cleared.
    pub fn fail_appends(&self, on: bool) {
        self.faults.fail_appends.store(on, Ordering::SeqCst);
    }

    /// Makes every subsequent flush and sync fail until cleared.
    pub fn fail_flush(&self, on: bool) {
        self.faults.fail_flush.store(on, Ordering::SeqCst);
    }

    /// Makes every subsequent truncate fail until cleared.
    pub fn fail_truncate(&self, on: bool) {
        self.faults.fail_truncate.store(on, Ordering::SeqCst);
    }

    /// Number of appends that reached the inner store.
    #[must_use]
    pub fn appends(&self) -> usize {
        self.faults.appends.load(Ordering::SeqCst)
    }
}

/// Wraps another store and fails writes on demand.
pub struct FaultyBackend {
    inner: Box<dyn StorageBackend>,
    handle: FaultHandle,
}

impl FaultyBackend {
    /// Wraps `inner`, returning the backend and the handle controlling it.
    pub fn new(inner: Box<dyn StorageBackend>) -> (Self, FaultHandle) {
        let handle = FaultHandle::default();
        (
            Self {
                inner,
                handle: handle.clone(),
            },
            handle,
        )
    }

    fn check_flush(&self) -> StorageResult<()> {
        if self.handle.faults.fail_flush.load(Ordering::SeqCst) {
            return Err(StorageError::Injected("flush"));
        }
        Ok(())
    }
}

impl StorageBackend for FaultyBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if self.handle.faults.fail_appends.load(Ordering::SeqCst) {
            return Err(StorageError::Injected("append"));
        }
        self.handle.faults.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.check_flush()?;
        self.inner.flush()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.check_flush()?;
        self.inner.sync()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        if self.handle.faults.fail_truncate.load(Ordering::SeqCst) {
            return Err(StorageError::Injected("truncate"));
        }
        self.inner.truncate(new_size)
    }
}
