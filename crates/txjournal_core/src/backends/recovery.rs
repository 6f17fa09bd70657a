//! Journal used while the local log is replayed.

use crate::entry::{CompletionCallback, JournalEntry};
use crate::error::JournalResult;
use crate::journal::{Journal, JournalKind};
use std::sync::atomic::{AtomicI64, Ordering};

/// Writes nothing and reports the LSNs the rows already carry.
///
/// During replay the log is being read, not produced: each row comes with
/// the LSN it was originally written at. The journal keeps the highest LSN
/// seen as its signature; an entry completes with the signature after its
/// rows are accounted for, so entries without rows report the current one.
#[derive(Debug, Default)]
pub struct RecoveryJournal {
    signature: AtomicI64,
}

impl RecoveryJournal {
    /// Creates a replay journal continuing from `signature`.
    #[must_use]
    pub fn new(signature: i64) -> Self {
        Self {
            signature: AtomicI64::new(signature),
        }
    }

    /// Highest LSN replayed so far.
    #[must_use]
    pub fn signature(&self) -> i64 {
        self.signature.load(Ordering::Acquire)
    }
}

impl Journal for RecoveryJournal {
    fn kind(&self) -> JournalKind {
        JournalKind::Recovery
    }

    fn name(&self) -> &'static str {
        "recovery"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        let res = match entry.rows().iter().map(|row| row.lsn).max() {
            Some(lsn) => self.signature.fetch_max(lsn, Ordering::AcqRel).max(lsn),
            None => self.signature(),
        };
        entry.complete_with(res);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::row::RowHeader;
    use std::sync::Arc;

    fn replayed(lsns: &[i64]) -> JournalEntry {
        let mut entry = JournalEntry::new(lsns.len(), &Region::unbounded()).unwrap();
        for lsn in lsns {
            entry
                .push_row(Arc::new(RowHeader::logged(1, *lsn, Vec::new())))
                .unwrap();
        }
        entry.bind_completion(|_| {});
        entry
    }

    #[test]
    fn reports_row_lsns() {
        let journal = RecoveryJournal::new(10);
        assert_eq!(journal.write(replayed(&[11, 12])).unwrap(), 12);
        assert_eq!(journal.write(replayed(&[13])).unwrap(), 13);
        assert_eq!(journal.signature(), 13);
    }

    #[test]
    fn empty_entry_reports_current_signature() {
        let journal = RecoveryJournal::new(7);
        assert_eq!(journal.write(replayed(&[])).unwrap(), 7);
    }

    #[test]
    fn signature_never_moves_back() {
        let journal = RecoveryJournal::new(0);
        journal.write(replayed(&[20])).unwrap();
        assert_eq!(journal.write(replayed(&[5])).unwrap(), 20);
    }
}
