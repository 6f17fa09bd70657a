//! Replaying a framed journal through the active journal.
//!
//! Every frame read back becomes a one-row entry submitted through the
//! registry, the same way transaction code would submit it. With a
//! [`RecoveryJournal`](crate::RecoveryJournal) installed this advances the
//! recovery signature to the last LSN on disk.

use crate::entry::JournalEntry;
use crate::error::JournalResult;
use crate::frame::FrameReader;
use crate::region::Region;
use crate::registry::JournalRegistry;
use crate::txn;
use std::sync::Arc;
use txjournal_storage::StorageBackend;

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Rows submitted.
    pub rows: u64,
    /// Result of the last submission, if any row was replayed.
    pub last_result: Option<i64>,
    /// Offset just past the last intact frame.
    pub end_offset: u64,
    /// Bytes of partial frame after `end_offset`. Only these may be
    /// truncated; a corrupt frame fails the replay instead.
    pub torn_tail: u64,
}

/// Replays every frame of `store` through `registry`.
///
/// # Errors
///
/// Returns the first corruption found in `store` or the first submission
/// error. Rows before the failure have already been replayed.
pub fn replay(
    registry: &JournalRegistry,
    store: &dyn StorageBackend,
) -> JournalResult<ReplayReport> {
    let region = Region::unbounded();
    let _txn = txn::begin();
    let mut reader = FrameReader::new(store, 0)?;
    let mut report = ReplayReport::default();

    for frame in reader.by_ref() {
        let (offset, row) = frame?;
        let mut entry = JournalEntry::new(1, &region)?;
        entry.push_row(Arc::new(row))?;
        entry.bind_completion(|_| {});
        let res = registry.submit(entry)?;

        tracing::trace!(offset, res, "replayed row");
        report.rows += 1;
        report.last_result = Some(res);
    }

    report.end_offset = reader.position();
    report.torn_tail = reader.torn_tail();
    tracing::debug!(
        rows = report.rows,
        end_offset = report.end_offset,
        torn_tail = report.torn_tail,
        journal = registry.current().name(),
        "journal replay finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BootstrapJournal, RecoveryJournal};
    use crate::error::JournalError;
    use crate::frame::encode_frame;
    use crate::row::RowHeader;
    use txjournal_storage::InMemoryBackend;

    fn framed(lsns: &[i64]) -> InMemoryBackend {
        let mut store = InMemoryBackend::new();
        for lsn in lsns {
            let frame = encode_frame(&RowHeader::new(vec![1, 2, 3]), 1, *lsn).unwrap();
            store.append(&frame).unwrap();
        }
        store
    }

    #[test]
    fn recovery_signature_follows_disk() {
        let recovery = Arc::new(RecoveryJournal::new(0));
        let registry = JournalRegistry::with_journal(recovery.clone());
        let store = framed(&[1, 2, 5]);

        let report = replay(&registry, &store).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.last_result, Some(5));
        assert_eq!(report.end_offset, store.size().unwrap());
        assert_eq!(recovery.signature(), 5);
    }

    #[test]
    fn empty_store_replays_nothing() {
        let registry = JournalRegistry::with_journal(Arc::new(BootstrapJournal::new()));
        let report = replay(&registry, &InMemoryBackend::new()).unwrap();
        assert_eq!(report, ReplayReport::default());
    }

    #[test]
    fn torn_tail_stops_at_last_intact_frame() {
        let full = framed(&[1, 2]).data();
        let store = InMemoryBackend::with_data(full[..full.len() - 1].to_vec());
        let registry = JournalRegistry::with_journal(Arc::new(RecoveryJournal::new(0)));

        let report = replay(&registry, &store).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.end_offset, (full.len() / 2) as u64);
        assert_eq!(report.torn_tail, (full.len() / 2 - 1) as u64);
    }

    #[test]
    fn damaged_frame_header_fails_replay() {
        let mut bytes = framed(&[1, 2, 3]).data();
        let frame_len = bytes.len() / 3;
        bytes[frame_len + 20] ^= 0x10;
        let store = InMemoryBackend::with_data(bytes);
        let recovery = Arc::new(RecoveryJournal::new(0));
        let registry = JournalRegistry::with_journal(recovery.clone());

        assert!(matches!(
            replay(&registry, &store),
            Err(JournalError::ChecksumMismatch { .. })
        ));
        assert_eq!(recovery.signature(), 1);
    }

    #[test]
    fn uninitialized_registry_fails_replay() {
        let registry = JournalRegistry::new();
        assert!(matches!(
            replay(&registry, &framed(&[1])),
            Err(JournalError::NotInitialized)
        ));
    }
}
