//! The byte-store contract the live journal writes through.

use crate::error::StorageResult;

/// An append-only byte store.
///
/// Stores are written by exactly one journal writer at a time and may be
/// read concurrently by recovery tooling, hence `Send + Sync`.
///
/// # Invariants
///
/// - `append` returns the offset of the first byte written
/// - `read_at` returns exactly the bytes appended at that offset
/// - after `flush` (and more strongly `sync`) returns, appended bytes survive
///   process termination
/// - `truncate` never grows the store
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::ReadPastEnd`] if the range is not
    /// fully inside the store, or an I/O error.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends `data` and returns the offset it was written at.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Appends several chunks back to back, returning the offset of the
    /// first one.
    ///
    /// The journal writer uses this to push a whole batch of frames with a
    /// single call. Chunks are not atomic as a group: on error the caller
    /// is expected to `truncate` back to the size it observed beforehand.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by `append`.
    fn append_all(&mut self, chunks: &[&[u8]]) -> StorageResult<u64> {
        let start = self.size()?;
        for chunk in chunks {
            self.append(chunk)?;
        }
        Ok(start)
    }

    /// Pushes buffered writes down to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Forces data and metadata to stable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Current size in bytes, which is also the next append offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Drops everything past `new_size`.
    ///
    /// Used to roll back a partially written batch.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_size` exceeds the current size or the
    /// operation fails.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;
}
