//! Journal used while a snapshot is loaded.

use crate::entry::{CompletionCallback, JournalEntry};
use crate::error::JournalResult;
use crate::journal::{Journal, JournalKind};

/// Completes every entry immediately with sequence number 0.
///
/// Rows recovered from a snapshot are not logged again and may be applied
/// in any order, so there is nothing meaningful to number them with.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapJournal;

impl BootstrapJournal {
    /// Creates the stub journal.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Journal for BootstrapJournal {
    fn kind(&self) -> JournalKind {
        JournalKind::Bootstrap
    }

    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        entry.complete_with(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn completes_inline_with_zero() {
        let seen = Arc::new(AtomicI64::new(-5));
        let s = Arc::clone(&seen);
        let entry = JournalEntry::new(0, &Region::unbounded()).unwrap();
        BootstrapJournal::new()
            .write_async(
                entry,
                Box::new(move |e: &JournalEntry| s.store(e.result().unwrap(), Ordering::SeqCst)),
            )
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
