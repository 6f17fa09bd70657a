//! Journal entries: a batch of rows plus its completion protocol.
//!
//! ## Lifecycle
//!
//! 1. [`JournalEntry::new`] sizes the entry for a known row count and
//!    charges it against the caller's [`Region`].
//! 2. Rows are pushed until the entry [`is_filled`](JournalEntry::is_filled).
//! 3. The entry is moved into a backend with a completion callback bound.
//! 4. The backend records a result and calls [`JournalEntry::complete`],
//!    which runs the callback exactly once and drops the entry, releasing
//!    its region lease.
//!
//! ## Invariants
//!
//! - Row capacity is fixed at creation; `rows().len() == n_rows()` is
//!   checked at submission
//! - The result is assigned once, before the callback fires
//! - `complete` consumes the entry, so it cannot run twice
//! - Rows are shared read-only (`Arc`) and stay alive as long as the entry

use crate::error::{JournalError, JournalResult};
use crate::region::{Region, RegionLease};
use crate::row::RowHeader;
use std::fmt;
use std::mem;
use std::sync::Arc;

/// Result recorded on an entry whose write failed.
pub const JOURNAL_ENTRY_ERR: i64 = -1;

/// One-shot completion handler.
///
/// Receives the entry after its result is final. Any context the handler
/// needs is captured by the closure.
pub type CompletionCallback = Box<dyn FnOnce(&JournalEntry) + Send + 'static>;

/// A write-ahead-log request: rows to be logged together with a single
/// outcome.
pub struct JournalEntry {
    rows: Vec<Arc<RowHeader>>,
    n_rows: usize,
    approx_len: usize,
    res: Option<i64>,
    on_complete: Option<CompletionCallback>,
    lease: RegionLease,
}

impl JournalEntry {
    /// Creates an entry able to hold exactly `n_rows` rows.
    ///
    /// The entry header and its row slots are charged against `region`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::OutOfMemory`] if the region is exhausted or
    /// the row slots cannot be allocated.
    pub fn new(n_rows: usize, region: &Region) -> JournalResult<Self> {
        let size = Self::footprint(n_rows);
        let mut rows = Vec::new();
        rows.try_reserve_exact(n_rows).map_err(|err| {
            tracing::warn!(n_rows, size, error = %err, "failed to allocate journal entry rows");
            JournalError::OutOfMemory {
                requested: size,
                available: 0,
            }
        })?;
        let lease = region.alloc(size).inspect_err(|err| {
            tracing::warn!(n_rows, size, error = %err, "failed to allocate journal entry");
        })?;

        Ok(Self {
            rows,
            n_rows,
            approx_len: 0,
            res: None,
            on_complete: None,
            lease,
        })
    }

    /// Bytes an entry of `n_rows` rows takes from its region.
    #[must_use]
    pub fn footprint(n_rows: usize) -> usize {
        let slots = n_rows.saturating_mul(mem::size_of::<Arc<RowHeader>>());
        mem::size_of::<Self>().saturating_add(slots)
    }

    /// Appends a row, adding its encoded size to `approx_len`.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::EntryFull`] once `n_rows` rows are present.
    pub fn push_row(&mut self, row: Arc<RowHeader>) -> JournalResult<()> {
        if self.rows.len() == self.n_rows {
            return Err(JournalError::EntryFull {
                capacity: self.n_rows,
            });
        }
        self.approx_len = self.approx_len.saturating_add(row.encoded_len());
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows the entry was sized for.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Rows pushed so far, in order.
    #[must_use]
    pub fn rows(&self) -> &[Arc<RowHeader>] {
        &self.rows
    }

    /// Whether every row slot is populated.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.rows.len() == self.n_rows
    }

    /// Checks that the entry can be submitted.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::IncompleteEntry`] if rows are missing.
    pub fn ensure_filled(&self) -> JournalResult<()> {
        if self.is_filled() {
            Ok(())
        } else {
            Err(JournalError::IncompleteEntry {
                expected: self.n_rows,
                actual: self.rows.len(),
            })
        }
    }

    /// Approximate encoded size. Advisory, used for batching only.
    #[must_use]
    pub fn approx_len(&self) -> usize {
        self.approx_len
    }

    /// Overrides the size estimate.
    pub fn set_approx_len(&mut self, approx_len: usize) {
        self.approx_len = approx_len;
    }

    /// Bytes this entry holds in its region.
    #[must_use]
    pub fn region_bytes(&self) -> usize {
        self.lease.size()
    }

    /// Attaches the completion handler, replacing any previous one.
    pub fn bind_completion<F>(&mut self, on_complete: F)
    where
        F: FnOnce(&JournalEntry) + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
    }

    /// Attaches an already boxed completion handler.
    pub fn bind_boxed_completion(&mut self, on_complete: CompletionCallback) {
        self.on_complete = Some(on_complete);
    }

    /// Detaches the completion handler, if any.
    pub fn take_completion(&mut self) -> Option<CompletionCallback> {
        self.on_complete.take()
    }

    /// Whether a completion handler is bound.
    #[must_use]
    pub fn has_completion(&self) -> bool {
        self.on_complete.is_some()
    }

    /// The final result, `None` until a backend assigns it.
    #[must_use]
    pub fn result(&self) -> Option<i64> {
        self.res
    }

    /// True if a non-negative result has been assigned.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.res.is_some_and(|res| res >= 0)
    }

    /// Records the entry's outcome. Backends call this exactly once.
    ///
    /// # Panics
    ///
    /// Panics if a result was already assigned.
    pub fn set_result(&mut self, res: i64) {
        assert!(
            self.res.is_none(),
            "journal entry result assigned twice ({:?} then {res})",
            self.res
        );
        self.res = Some(res);
    }

    /// Runs the completion handler and releases the entry.
    ///
    /// # Panics
    ///
    /// Panics if no result has been assigned.
    pub fn complete(mut self) {
        assert!(
            self.res.is_some(),
            "journal entry completed before its result was assigned"
        );
        match self.on_complete.take() {
            Some(on_complete) => on_complete(&self),
            None => tracing::warn!(
                n_rows = self.n_rows,
                "journal entry completed with no callback bound"
            ),
        }
    }

    /// Assigns `res` and completes.
    pub fn complete_with(mut self, res: i64) {
        self.set_result(res);
        self.complete();
    }

    /// Completes the entry as failed.
    pub fn fail(self) {
        self.complete_with(JOURNAL_ENTRY_ERR);
    }
}

impl Drop for JournalEntry {
    fn drop(&mut self) {
        if self.res.is_some() && self.on_complete.is_some() {
            tracing::error!(
                n_rows = self.n_rows,
                res = ?self.res,
                "journal entry dropped with a result but without completion"
            );
        }
    }
}

impl fmt::Debug for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalEntry")
            .field("n_rows", &self.n_rows)
            .field("rows", &self.rows.len())
            .field("approx_len", &self.approx_len)
            .field("res", &self.res)
            .field("has_completion", &self.on_complete.is_some())
            .finish()
    }
}
