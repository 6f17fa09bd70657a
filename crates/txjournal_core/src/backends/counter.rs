//! Journal for `wal_mode = none`.

use crate::entry::{CompletionCallback, JournalEntry};
use crate::error::JournalResult;
use crate::journal::{Journal, JournalKind};
use std::sync::atomic::{AtomicI64, Ordering};

/// Manufactures sequence numbers from an in-memory counter.
///
/// Nothing reaches storage, so a crash loses everything since the last
/// snapshot, but callers still get strictly increasing sequence numbers.
#[derive(Debug, Default)]
pub struct CounterJournal {
    counter: AtomicI64,
}

impl CounterJournal {
    /// Creates a counter continuing after `start`.
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            counter: AtomicI64::new(start),
        }
    }

    /// Last sequence number handed out.
    #[must_use]
    pub fn signature(&self) -> i64 {
        self.counter.load(Ordering::Acquire)
    }
}

impl Journal for CounterJournal {
    fn kind(&self) -> JournalKind {
        JournalKind::Disabled
    }

    fn name(&self) -> &'static str {
        "counter"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        let res = self.counter.fetch_add(1, Ordering::AcqRel) + 1;
        entry.complete_with(res);
        Ok(())
    }
}
