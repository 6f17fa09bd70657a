//! Journal writer statistics.
//!
//! Counters are updated by the live journal's writer thread and can be
//! read at any time through [`crate::LiveJournal::stats`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a journal writer.
#[derive(Debug, Default)]
pub struct JournalStats {
    /// Entries completed successfully.
    entries: AtomicU64,
    /// Rows written.
    rows: AtomicU64,
    /// Frame bytes written.
    bytes: AtomicU64,
    /// Batches flushed.
    batches: AtomicU64,
    /// Entries completed with a failure result.
    failed_entries: AtomicU64,
}

impl JournalStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_batch(&self, entries: usize, rows: usize, bytes: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.entries.fetch_add(entries as u64, Ordering::Relaxed);
        self.rows.fetch_add(rows as u64, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, entries: usize) {
        self.failed_entries
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entries: self.entries.load(Ordering::Relaxed),
            rows: self.rows.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            failed_entries: self.failed_entries.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`JournalStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Entries completed successfully.
    pub entries: u64,
    /// Rows written.
    pub rows: u64,
    /// Frame bytes written.
    pub bytes: u64,
    /// Batches flushed.
    pub batches: u64,
    /// Entries completed with a failure result.
    pub failed_entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = JournalStats::new();
        stats.record_batch(3, 5, 200);
        stats.record_batch(1, 0, 0);
        stats.record_failure(2);

        let snap = stats.snapshot();
        assert_eq!(snap.batches, 2);
        assert_eq!(snap.entries, 4);
        assert_eq!(snap.rows, 5);
        assert_eq!(snap.bytes, 200);
        assert_eq!(snap.failed_entries, 2);
    }
}
