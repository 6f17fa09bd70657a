//! Test fixtures: scripted journals, entry builders and temp files.
//!
//! The journals here let a test decide when and how an entry completes,
//! which the production backends never expose.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use txjournal_core::{
    CompletionCallback, Journal, JournalEntry, JournalKind, JournalResult, Region, RowHeader,
    JOURNAL_ENTRY_ERR,
};
use txjournal_storage::FileBackend;

/// A journal that parks every entry until the test completes it.
///
/// Entries are completed in arrival order with [`ManualJournal::complete_next`].
/// On destroy, whatever is still parked fails with [`JOURNAL_ENTRY_ERR`].
pub struct ManualJournal {
    kind: JournalKind,
    pending: Mutex<VecDeque<JournalEntry>>,
    arrived: Condvar,
    destroys: AtomicUsize,
}

impl ManualJournal {
    /// Creates a live-kind manual journal.
    pub fn new() -> Self {
        Self::with_kind(JournalKind::Live)
    }

    /// Creates a manual journal reporting `kind`.
    pub fn with_kind(kind: JournalKind) -> Self {
        Self {
            kind,
            pending: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
            destroys: AtomicUsize::new(0),
        }
    }

    /// Number of parked entries.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Waits until at least `count` entries are parked.
    ///
    /// Returns `false` on timeout.
    pub fn wait_pending(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while pending.len() < count {
            if self.arrived.wait_until(&mut pending, deadline).timed_out() {
                return pending.len() >= count;
            }
        }
        true
    }

    /// Completes the oldest parked entry with `res`.
    ///
    /// Returns `false` if nothing was parked.
    pub fn complete_next(&self, res: i64) -> bool {
        // The callback may resubmit; it must not run under the lock.
        let next = self.pending.lock().pop_front();
        match next {
            Some(entry) => {
                entry.complete_with(res);
                true
            }
            None => false,
        }
    }

    /// How many times `destroy` ran.
    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

impl Default for ManualJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal for ManualJournal {
    fn kind(&self) -> JournalKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "manual"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        self.pending.lock().push_back(entry);
        self.arrived.notify_all();
        Ok(())
    }

    fn destroy(&self) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        while self.complete_next(JOURNAL_ENTRY_ERR) {}
    }
}

/// A journal completing every entry inline with a fixed result.
#[derive(Debug)]
pub struct ImmediateJournal {
    kind: JournalKind,
    res: i64,
}

impl ImmediateJournal {
    /// Completes every entry with `res`.
    pub fn new(res: i64) -> Self {
        Self::with_kind(JournalKind::Live, res)
    }

    /// Completes every entry with `res`, reporting `kind`.
    pub fn with_kind(kind: JournalKind, res: i64) -> Self {
        Self { kind, res }
    }
}

impl Journal for ImmediateJournal {
    fn kind(&self) -> JournalKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "immediate"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        entry.complete_with(self.res);
        Ok(())
    }
}

/// An inline counting journal that records writes and teardowns.
#[derive(Debug)]
pub struct CountingJournal {
    kind: JournalKind,
    name: &'static str,
    next: AtomicI64,
    writes: AtomicUsize,
    destroys: AtomicUsize,
}

impl CountingJournal {
    /// Creates a live-kind counting journal reporting `name` in logs.
    pub fn new(name: &'static str) -> Self {
        Self::with_kind(JournalKind::Live, name)
    }

    /// Creates a counting journal reporting `kind`.
    pub fn with_kind(kind: JournalKind, name: &'static str) -> Self {
        Self {
            kind,
            name,
            next: AtomicI64::new(0),
            writes: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
        }
    }

    /// Entries accepted so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// How many times `destroy` ran.
    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

impl Journal for CountingJournal {
    fn kind(&self) -> JournalKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        entry.bind_boxed_completion(on_complete);
        entry.complete_with(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(())
    }

    fn destroy(&self) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builds a shared row with the given body.
pub fn row(body: impl Into<Vec<u8>>) -> Arc<RowHeader> {
    Arc::new(RowHeader::new(body.into()))
}

/// Builds an entry of `n_rows` rows charged against `region`.
///
/// Row `i` has an 8-byte body filled with `i`. No callback is bound.
pub fn filled_entry(n_rows: usize, region: &Region) -> JournalEntry {
    let mut entry = JournalEntry::new(n_rows, region).expect("region exhausted");
    for i in 0..n_rows {
        entry
            .push_row(row(vec![i as u8; 8]))
            .expect("entry sized for n_rows");
    }
    entry
}

/// Builds a filled entry on an unbounded region with a no-op callback
/// bound, ready for [`Journal::write`].
pub fn bound_entry(n_rows: usize) -> JournalEntry {
    let mut entry = filled_entry(n_rows, &Region::unbounded());
    entry.bind_completion(|_| {});
    entry
}

/// Builds an entry holding exactly `rows`.
///
/// # Errors
///
/// Returns an error if the region cannot fit the entry.
pub fn entry_from_rows(rows: Vec<Arc<RowHeader>>, region: &Region) -> JournalResult<JournalEntry> {
    let mut entry = JournalEntry::new(rows.len(), region)?;
    for row in rows {
        entry.push_row(row)?;
    }
    Ok(entry)
}

/// Records entry results in completion order.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    inner: Arc<(Mutex<Vec<i64>>, Condvar)>,
}

impl ResultLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A completion callback appending the entry's result to this log.
    pub fn callback(&self) -> impl FnOnce(&JournalEntry) + Send + 'static {
        let inner = Arc::clone(&self.inner);
        move |entry: &JournalEntry| {
            let (results, done) = &*inner;
            results
                .lock()
                .push(entry.result().unwrap_or(JOURNAL_ENTRY_ERR));
            done.notify_all();
        }
    }

    /// Boxed form of [`ResultLog::callback`].
    pub fn boxed(&self) -> CompletionCallback {
        Box::new(self.callback())
    }

    /// Results seen so far.
    pub fn results(&self) -> Vec<i64> {
        self.inner.0.lock().clone()
    }

    /// Number of completions seen.
    pub fn len(&self) -> usize {
        self.inner.0.lock().len()
    }

    /// Whether no completion was seen yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for at least `count` completions. Returns `false` on timeout.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (results, done) = &*self.inner;
        let mut results = results.lock();
        while results.len() < count {
            if done.wait_until(&mut results, deadline).timed_out() {
                return results.len() >= count;
            }
        }
        true
    }
}

/// A journal file in a temporary directory, removed on drop.
pub struct TempJournalFile {
    path: PathBuf,
    _dir: TempDir,
}

impl TempJournalFile {
    /// Creates a fresh, not yet existing, journal path.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: dir.path().join("journal.txj"),
            _dir: dir,
        }
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file for appending, creating it if needed.
    pub fn open(&self) -> FileBackend {
        FileBackend::open(&self.path).expect("Failed to open journal file")
    }
}

impl Default for TempJournalFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn manual_journal_completes_in_arrival_order() {
        let journal = ManualJournal::new();
        let log = ResultLog::new();
        journal.write_async(bound_entry(1), log.boxed()).unwrap();
        journal.write_async(bound_entry(2), log.boxed()).unwrap();

        assert_eq!(journal.pending(), 2);
        assert!(journal.complete_next(10));
        assert!(journal.complete_next(11));
        assert!(!journal.complete_next(12));
        assert_eq!(log.results(), vec![10, 11]);
    }

    #[test]
    fn manual_journal_fails_parked_entries_on_destroy() {
        let journal = ManualJournal::new();
        let log = ResultLog::new();
        journal.write_async(bound_entry(0), log.boxed()).unwrap();

        journal.destroy();
        assert_eq!(journal.destroys(), 1);
        assert_eq!(log.results(), vec![JOURNAL_ENTRY_ERR]);
    }

    #[test]
    fn wait_pending_sees_other_thread() {
        let journal = Arc::new(ManualJournal::new());
        let submitter = {
            let journal = Arc::clone(&journal);
            thread::spawn(move || journal.write(bound_entry(1)))
        };

        assert!(journal.wait_pending(1, Duration::from_secs(5)));
        journal.complete_next(5);
        assert_eq!(submitter.join().unwrap().unwrap(), 5);
    }

    #[test]
    fn counting_journal_counts_writes() {
        let journal = CountingJournal::new("counting");
        assert_eq!(journal.write(bound_entry(1)).unwrap(), 1);
        assert_eq!(journal.write(bound_entry(1)).unwrap(), 2);
        assert_eq!(journal.writes(), 2);
        assert_eq!(journal.destroys(), 0);
    }

    #[test]
    fn filled_entry_charges_region() {
        let region = Region::new(4096);
        let entry = filled_entry(3, &region);
        assert!(entry.is_filled());
        assert_eq!(region.used(), JournalEntry::footprint(3));
    }

    #[test]
    fn temp_file_starts_empty() {
        use txjournal_storage::StorageBackend;

        let file = TempJournalFile::new();
        assert_eq!(file.open().size().unwrap(), 0);
    }
}
