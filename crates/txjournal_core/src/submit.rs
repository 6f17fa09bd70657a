//! Submission entry points used by transaction code.
//!
//! Both paths must be called from inside a transaction context
//! ([`crate::txn::begin`]). Calling them elsewhere is a programming error
//! and panics.

use crate::entry::JournalEntry;
use crate::error::JournalResult;
use crate::registry::{global, JournalRegistry};

fn check_submission(entry: &JournalEntry) -> JournalResult<()> {
    assert!(
        crate::txn::in_txn(),
        "journal submission outside of a transaction"
    );
    entry.ensure_filled()
}

impl JournalRegistry {
    /// Writes `entry` through the active journal and waits for it.
    ///
    /// The entry must have a completion callback bound. Returns the entry's
    /// sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::JournalError::IncompleteEntry`] if rows are missing,
    /// otherwise whatever [`crate::Journal::write`] returns.
    ///
    /// # Panics
    ///
    /// Panics outside a transaction context.
    pub fn submit(&self, entry: JournalEntry) -> JournalResult<i64> {
        check_submission(&entry)?;
        self.current().write(entry)
    }

    /// Hands `entry` to the active journal without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::JournalError::IncompleteEntry`] if rows are missing,
    /// otherwise whatever [`crate::Journal::write_async`] returns.
    ///
    /// # Panics
    ///
    /// Panics outside a transaction context.
    pub fn submit_async<F>(&self, entry: JournalEntry, on_complete: F) -> JournalResult<()>
    where
        F: FnOnce(&JournalEntry) + Send + 'static,
    {
        check_submission(&entry)?;
        self.current().write_async(entry, Box::new(on_complete))
    }
}

/// [`JournalRegistry::submit`] on the process-wide registry.
///
/// # Errors
///
/// See [`JournalRegistry::submit`].
pub fn submit(entry: JournalEntry) -> JournalResult<i64> {
    global().submit(entry)
}

/// [`JournalRegistry::submit_async`] on the process-wide registry.
///
/// # Errors
///
/// See [`JournalRegistry::submit_async`].
pub fn submit_async<F>(entry: JournalEntry, on_complete: F) -> JournalResult<()>
where
    F: FnOnce(&JournalEntry) + Send + 'static,
{
    global().submit_async(entry, on_complete)
}
