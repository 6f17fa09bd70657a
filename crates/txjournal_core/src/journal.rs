//! The abstract journal every durability backend implements.

use crate::completion;
use crate::entry::{CompletionCallback, JournalEntry};
use crate::error::{JournalError, JournalResult};
use std::fmt;

/// Phase of the instance lifecycle a journal serves.
///
/// The registry uses the kind to reject swaps that would move the
/// lifecycle backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalKind {
    /// Placeholder installed before any real journal.
    Unset,
    /// Snapshot recovery: results are placeholders.
    Bootstrap,
    /// Local log replay: results come from the rows themselves.
    Recovery,
    /// `wal_mode = none`: a counter fakes sequence numbers.
    Disabled,
    /// A real durability pipeline.
    Live,
}

impl JournalKind {
    const fn rank(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Bootstrap => 1,
            Self::Recovery => 2,
            Self::Disabled | Self::Live => 3,
        }
    }

    /// Whether a journal of kind `next` may replace one of this kind.
    ///
    /// The lifecycle only moves forward: bootstrap, then recovery, then a
    /// runtime journal. Runtime journals may replace each other.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        let (from, to) = (self.rank(), next.rank());
        to > from || (from == 3 && to == 3)
    }
}

impl fmt::Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unset => "unset",
            Self::Bootstrap => "bootstrap",
            Self::Recovery => "recovery",
            Self::Disabled => "disabled",
            Self::Live => "live",
        })
    }
}

/// A durability backend.
///
/// Implementors only have to provide [`Journal::write_async`]; the blocking
/// [`Journal::write`] is derived from it and [`Journal::destroy`] defaults
/// to doing nothing.
///
/// # Contract
///
/// - An entry accepted by `write_async` (`Ok(())`) is completed exactly
///   once, with its result set first, either before `write_async` returns
///   or later from any thread
/// - An entry rejected by `write_async` (`Err`) is never completed
/// - Entries submitted in sequence complete with non-decreasing results
pub trait Journal: Send + Sync {
    /// Lifecycle phase this journal serves.
    fn kind(&self) -> JournalKind {
        JournalKind::Live
    }

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Submits `entry` without waiting for it to be logged.
    ///
    /// `on_complete` replaces whatever callback the entry had bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be accepted, e.g. because a
    /// queue is full. This says nothing about the eventual write outcome.
    fn write_async(&self, entry: JournalEntry, on_complete: CompletionCallback)
        -> JournalResult<()>;

    /// Submits `entry` and blocks until it has been completed.
    ///
    /// The entry's own bound callback runs before this returns. Returns the
    /// entry's sequence number on success.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::MissingCompletion`] if no callback is bound,
    /// any submission error from `write_async`, or
    /// [`JournalError::WriteFailed`] if the entry completed with a failure
    /// result.
    fn write(&self, entry: JournalEntry) -> JournalResult<i64> {
        write_via_async(self, entry)
    }

    /// Releases backend resources. Called at most once, when the journal
    /// is replaced or shut down.
    fn destroy(&self) {}
}

/// Blocking write built on top of [`Journal::write_async`].
///
/// Wraps the entry's bound callback so that, after it runs, the suspended
/// caller is resumed with the entry's result.
///
/// # Errors
///
/// See [`Journal::write`].
pub fn write_via_async<J>(journal: &J, mut entry: JournalEntry) -> JournalResult<i64>
where
    J: Journal + ?Sized,
{
    let on_complete = entry
        .take_completion()
        .ok_or(JournalError::MissingCompletion)?;
    let (resolver, waiter) = completion::oneshot();

    journal.write_async(
        entry,
        Box::new(move |entry: &JournalEntry| {
            on_complete(entry);
            // complete() asserts a result is present
            resolver.resolve(entry.result().unwrap_or(crate::entry::JOURNAL_ENTRY_ERR));
        }),
    )?;

    match waiter.wait()? {
        res if res >= 0 => Ok(res),
        res => Err(JournalError::WriteFailed { result: res }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// Completes inline with a fixed result.
    struct Fixed(i64);

    impl Journal for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn write_async(
            &self,
            mut entry: JournalEntry,
            on_complete: CompletionCallback,
        ) -> JournalResult<()> {
            entry.bind_boxed_completion(on_complete);
            entry.complete_with(self.0);
            Ok(())
        }
    }

    /// Completes from another thread after a delay.
    struct Deferred(i64);

    impl Journal for Deferred {
        fn name(&self) -> &'static str {
            "deferred"
        }

        fn write_async(
            &self,
            mut entry: JournalEntry,
            on_complete: CompletionCallback,
        ) -> JournalResult<()> {
            entry.bind_boxed_completion(on_complete);
            let res = self.0;
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                entry.complete_with(res);
            });
            Ok(())
        }
    }

    /// Accepts entries and then loses them.
    struct Leaky;

    impl Journal for Leaky {
        fn name(&self) -> &'static str {
            "leaky"
        }

        fn write_async(&self, entry: JournalEntry, _: CompletionCallback) -> JournalResult<()> {
            drop(entry);
            Ok(())
        }
    }

    fn flagged_entry(flag: &Arc<AtomicBool>) -> JournalEntry {
        let mut entry = JournalEntry::new(0, &Region::unbounded()).unwrap();
        let flag = Arc::clone(flag);
        entry.bind_completion(move |_| flag.store(true, Ordering::SeqCst));
        entry
    }

    #[test]
    fn kind_transitions_only_move_forward() {
        use JournalKind::*;
        assert!(Unset.can_transition_to(Bootstrap));
        assert!(Bootstrap.can_transition_to(Recovery));
        assert!(Recovery.can_transition_to(Live));
        assert!(Recovery.can_transition_to(Disabled));
        assert!(Unset.can_transition_to(Live));
        assert!(Live.can_transition_to(Live));
        assert!(Disabled.can_transition_to(Live));
        assert!(!Live.can_transition_to(Recovery));
        assert!(!Recovery.can_transition_to(Bootstrap));
        assert!(!Bootstrap.can_transition_to(Bootstrap));
        assert!(!Live.can_transition_to(Unset));
    }

    #[test]
    fn write_runs_callback_before_returning() {
        let flag = Arc::new(AtomicBool::new(false));
        let res = Fixed(42).write(flagged_entry(&flag)).unwrap();
        assert_eq!(res, 42);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn write_waits_for_deferred_failure() {
        let flag = Arc::new(AtomicBool::new(false));
        let err = Deferred(-1).write(flagged_entry(&flag)).unwrap_err();
        assert!(matches!(err, JournalError::WriteFailed { result: -1 }));
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn write_requires_bound_callback() {
        let entry = JournalEntry::new(0, &Region::unbounded()).unwrap();
        assert!(matches!(
            Fixed(1).write(entry),
            Err(JournalError::MissingCompletion)
        ));
    }

    #[test]
    fn lost_entry_surfaces_as_abandoned() {
        let flag = Arc::new(AtomicBool::new(false));
        assert!(matches!(
            Leaky.write(flagged_entry(&flag)),
            Err(JournalError::Abandoned)
        ));
        assert!(!flag.load(Ordering::SeqCst));
    }
}
