//! Error types for journal submission.

use crate::journal::JournalKind;
use std::io;
use thiserror::Error;

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors surfaced by entry construction, submission and backends.
///
/// Allocation and submission failures are reported synchronously at the
/// call site. A completion failure only reaches the caller through the
/// entry's result (and, for the blocking path, as [`JournalError::WriteFailed`]).
#[derive(Debug, Error)]
pub enum JournalError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] txjournal_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The region could not satisfy an allocation.
    #[error("region out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
        /// Bytes left in the region.
        available: usize,
    },

    /// The region still has live allocations and cannot be reclaimed.
    #[error("region busy: {outstanding} allocations still alive")]
    RegionBusy {
        /// Number of live leases.
        outstanding: usize,
    },

    /// More rows were pushed than the entry was sized for.
    #[error("journal entry full: capacity {capacity} rows")]
    EntryFull {
        /// Row capacity fixed at creation.
        capacity: usize,
    },

    /// An entry was submitted before all of its rows were filled in.
    #[error("journal entry incomplete: expected {expected} rows, got {actual}")]
    IncompleteEntry {
        /// Row count fixed at creation.
        expected: usize,
        /// Rows actually present.
        actual: usize,
    },

    /// A blocking write was requested for an entry with no completion bound.
    #[error("journal entry has no completion callback bound")]
    MissingCompletion,

    /// No journal has been installed yet.
    #[error("journal is not initialized")]
    NotInitialized,

    /// The backend's submission queue is full.
    #[error("journal queue full: capacity {capacity}")]
    QueueFull {
        /// Queue capacity.
        capacity: usize,
    },

    /// The backend has been torn down and accepts no more entries.
    #[error("journal is closed")]
    Closed,

    /// The entry completed with a failure result.
    #[error("journal write failed with result {result}")]
    WriteFailed {
        /// The failure result recorded on the entry.
        result: i64,
    },

    /// The backend dropped an accepted entry without completing it.
    #[error("journal entry abandoned without completion")]
    Abandoned,

    /// The requested backend swap violates the instance lifecycle.
    #[error("invalid journal transition from {from} to {to}")]
    InvalidTransition {
        /// Kind of the installed journal.
        from: JournalKind,
        /// Kind of the journal being installed.
        to: JournalKind,
    },

    /// The next row would need an LSN past `i64::MAX`.
    #[error("journal LSN space exhausted at signature {signature}")]
    LsnExhausted {
        /// Signature the writer could not advance from.
        signature: i64,
    },

    /// Journal bytes are malformed.
    #[error("journal corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Offset of the bad frame.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A frame's checksum does not match its contents.
    #[error("checksum mismatch at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Offset of the frame.
        offset: u64,
        /// Stored checksum.
        expected: u32,
        /// Computed checksum.
        actual: u32,
    },
}

impl JournalError {
    /// Creates a corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }

    /// Returns true for errors raised before the backend accepted the entry.
    #[must_use]
    pub fn is_submission_failure(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized
                | Self::QueueFull { .. }
                | Self::Closed
                | Self::MissingCompletion
                | Self::IncompleteEntry { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_failures_are_distinguished_from_completion_failures() {
        assert!(JournalError::QueueFull { capacity: 4 }.is_submission_failure());
        assert!(JournalError::NotInitialized.is_submission_failure());
        assert!(!JournalError::WriteFailed { result: -1 }.is_submission_failure());
        assert!(!JournalError::Abandoned.is_submission_failure());
    }

    #[test]
    fn messages_carry_context() {
        let err = JournalError::InvalidTransition {
            from: JournalKind::Live,
            to: JournalKind::Bootstrap,
        };
        assert_eq!(
            err.to_string(),
            "invalid journal transition from live to bootstrap"
        );
        assert_eq!(
            JournalError::corrupted(12, "bad magic").to_string(),
            "journal corrupted at offset 12: bad magic"
        );
    }
}
