//! Placeholder journal for an uninitialized registry.

use crate::entry::{CompletionCallback, JournalEntry};
use crate::error::{JournalError, JournalResult};
use crate::journal::{Journal, JournalKind};

/// Refuses every submission with [`JournalError::NotInitialized`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWriteJournal;

impl Journal for NoWriteJournal {
    fn kind(&self) -> JournalKind {
        JournalKind::Unset
    }

    fn name(&self) -> &'static str {
        "no-write"
    }

    fn write_async(&self, entry: JournalEntry, _: CompletionCallback) -> JournalResult<()> {
        tracing::warn!(n_rows = entry.n_rows(), "journal write before initialization");
        Err(JournalError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;

    #[test]
    fn rejects_without_completing() {
        let mut entry = JournalEntry::new(0, &Region::unbounded()).unwrap();
        entry.bind_completion(|_| panic!("rejected entries never complete"));
        assert!(matches!(
            NoWriteJournal.write(entry),
            Err(JournalError::NotInitialized)
        ));
    }
}
