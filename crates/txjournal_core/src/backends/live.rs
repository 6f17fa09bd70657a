//! The durable journal: a dedicated writer thread appending frames.
//!
//! ## Pipeline
//!
//! 1. `write_async` pushes the entry onto a bounded queue (never blocks;
//!    a full queue rejects the entry)
//! 2. The writer thread pops a batch, up to `max_batch_bytes` of
//!    `approx_len`
//! 3. Every row gets the next LSN and is framed; the whole batch is
//!    appended, flushed and optionally synced
//! 4. Entries are completed in queue order with the LSN of their last row
//!
//! If any step of 3 fails, the store is truncated back to where the batch
//! started, the LSN counter is not advanced, and every entry of the batch
//! completes with [`JOURNAL_ENTRY_ERR`]. A batch that would push the LSN
//! past `i64::MAX` fails the same way before anything is appended.
//!
//! If that truncate fails too, the store holds rows the signature does not
//! cover and the journal is failed for good: new entries are refused with
//! [`JournalError::Closed`] and anything still queued completes with
//! [`JOURNAL_ENTRY_ERR`].
//!
//! ## Teardown
//!
//! `destroy` closes the queue and joins the writer. The writer drains what
//! is already queued first, so every accepted entry still completes.

use crate::config::LiveJournalConfig;
use crate::entry::{CompletionCallback, JournalEntry, JOURNAL_ENTRY_ERR};
use crate::error::{JournalError, JournalResult};
use crate::frame::encode_frame;
use crate::journal::{Journal, JournalKind};
use crate::stats::{JournalStats, StatsSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use txjournal_storage::StorageBackend;

type SharedStorage = Arc<Mutex<Box<dyn StorageBackend>>>;

/// State shared between the journal handle and its writer thread.
struct WriterState {
    storage: SharedStorage,
    signature: AtomicI64,
    /// Set once the store is out of step with `signature`.
    failed: AtomicBool,
    stats: JournalStats,
    config: LiveJournalConfig,
}

/// Journal backed by a writer thread and a [`StorageBackend`].
pub struct LiveJournal {
    queue: Mutex<Option<SyncSender<JournalEntry>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    state: Arc<WriterState>,
}

impl LiveJournal {
    /// Starts a writer thread appending to `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer thread cannot be spawned.
    pub fn start(
        storage: Box<dyn StorageBackend>,
        config: LiveJournalConfig,
    ) -> JournalResult<Self> {
        let config = LiveJournalConfig {
            queue_capacity: config.queue_capacity.max(1),
            ..config
        };
        let (tx, rx) = mpsc::sync_channel(config.queue_capacity);
        let state = Arc::new(WriterState {
            storage: Arc::new(Mutex::new(storage)),
            signature: AtomicI64::new(config.start_lsn),
            failed: AtomicBool::new(false),
            stats: JournalStats::new(),
            config,
        });

        let writer_state = Arc::clone(&state);
        let writer = thread::Builder::new()
            .name("journal-writer".into())
            .spawn(move || run_writer(&rx, &writer_state))?;

        tracing::debug!(
            start_lsn = state.config.start_lsn,
            queue_capacity = state.config.queue_capacity,
            "journal writer started"
        );
        Ok(Self {
            queue: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
            state,
        })
    }

    /// LSN of the last row written.
    #[must_use]
    pub fn signature(&self) -> i64 {
        self.state.signature.load(Ordering::Acquire)
    }

    /// Counters of the writer thread.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.state.stats.snapshot()
    }

    /// The store frames are written to, for inspection and recovery.
    #[must_use]
    pub fn storage(&self) -> SharedStorage {
        Arc::clone(&self.state.storage)
    }

    /// Whether the journal still accepts entries.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.queue.lock().is_some() && !self.is_failed()
    }

    /// Whether a failed rollback left the store ahead of the signature.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state.failed.load(Ordering::Acquire)
    }

    fn stop(&self) {
        // Dropping the only sender lets the writer drain and exit.
        drop(self.queue.lock().take());

        let Some(writer) = self.writer.lock().take() else {
            return;
        };
        if writer.thread().id() == thread::current().id() {
            // Torn down from one of our own completion callbacks; the writer
            // exits on its own once the queue is drained.
            return;
        }
        if writer.join().is_err() {
            tracing::error!("journal writer panicked");
        }
        tracing::debug!(signature = self.signature(), "journal writer stopped");
    }
}

impl Journal for LiveJournal {
    fn kind(&self) -> JournalKind {
        JournalKind::Live
    }

    fn name(&self) -> &'static str {
        "live"
    }

    fn write_async(
        &self,
        mut entry: JournalEntry,
        on_complete: CompletionCallback,
    ) -> JournalResult<()> {
        entry.bind_boxed_completion(on_complete);
        if self.is_failed() {
            return Err(JournalError::Closed);
        }
        let queue = self.queue.lock();
        let Some(tx) = queue.as_ref() else {
            return Err(JournalError::Closed);
        };
        match tx.try_send(entry) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    capacity = self.state.config.queue_capacity,
                    "journal queue full, entry rejected"
                );
                Err(JournalError::QueueFull {
                    capacity: self.state.config.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(JournalError::Closed),
        }
    }

    fn destroy(&self) {
        self.stop();
    }
}

impl Drop for LiveJournal {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_writer(rx: &Receiver<JournalEntry>, state: &WriterState) {
    while let Ok(first) = rx.recv() {
        let mut bytes = first.approx_len();
        let mut batch = vec![first];
        while bytes < state.config.max_batch_bytes {
            match rx.try_recv() {
                Ok(entry) => {
                    bytes = bytes.saturating_add(entry.approx_len());
                    batch.push(entry);
                }
                Err(_) => break,
            }
        }
        write_batch(state, batch);
    }
}

fn fail_batch(state: &WriterState, batch: Vec<JournalEntry>) {
    state.stats.record_failure(batch.len());
    for entry in batch {
        entry.complete_with(JOURNAL_ENTRY_ERR);
    }
}

fn write_batch(state: &WriterState, batch: Vec<JournalEntry>) {
    if state.failed.load(Ordering::Acquire) {
        tracing::warn!(entries = batch.len(), "journal failed, rejecting queued batch");
        fail_batch(state, batch);
        return;
    }

    let start_lsn = state.signature.load(Ordering::Acquire);
    let outcome = {
        let mut storage = state.storage.lock();
        append_batch(storage.as_mut(), &batch, start_lsn, &state.config)
    };

    match outcome {
        Ok(written) => {
            let last = written.ends.last().copied().unwrap_or(start_lsn);
            state.signature.store(last, Ordering::Release);
            state
                .stats
                .record_batch(batch.len(), written.rows, written.bytes);
            tracing::debug!(
                entries = batch.len(),
                rows = written.rows,
                bytes = written.bytes,
                signature = last,
                "journal batch written"
            );
            for (entry, res) in batch.into_iter().zip(written.ends) {
                entry.complete_with(res);
            }
        }
        Err(BatchError::RolledBack(err)) => {
            tracing::error!(entries = batch.len(), error = %err, "journal batch failed");
            fail_batch(state, batch);
        }
        Err(BatchError::Unrecoverable(err)) => {
            state.failed.store(true, Ordering::Release);
            tracing::error!(
                entries = batch.len(),
                signature = start_lsn,
                error = %err,
                "journal batch failed and could not be rolled back, journal is now failed"
            );
            fail_batch(state, batch);
        }
    }
}

enum BatchError {
    /// Nothing of the batch is left in the store.
    RolledBack(JournalError),
    /// The store may hold part of the batch.
    Unrecoverable(JournalError),
}

struct Written {
    /// Per entry, the LSN of its last row.
    ends: Vec<i64>,
    rows: usize,
    bytes: usize,
}

fn append_batch(
    storage: &mut dyn StorageBackend,
    batch: &[JournalEntry],
    start_lsn: i64,
    config: &LiveJournalConfig,
) -> Result<Written, BatchError> {
    let mut lsn = start_lsn;
    let mut frames = Vec::new();
    let mut ends = Vec::with_capacity(batch.len());
    for entry in batch {
        for row in entry.rows() {
            lsn = lsn.checked_add(1).ok_or_else(|| {
                BatchError::RolledBack(JournalError::LsnExhausted {
                    signature: start_lsn,
                })
            })?;
            let frame =
                encode_frame(row, config.replica_id, lsn).map_err(BatchError::RolledBack)?;
            frames.push(frame);
        }
        ends.push(lsn);
    }

    let mark = storage
        .size()
        .map_err(|err| BatchError::RolledBack(err.into()))?;
    let chunks: Vec<&[u8]> = frames.iter().map(Vec::as_slice).collect();
    let result = storage
        .append_all(&chunks)
        .and_then(|_| storage.flush())
        .and_then(|()| {
            if config.sync_on_write {
                storage.sync()
            } else {
                Ok(())
            }
        });

    if let Err(err) = result {
        if let Err(rollback) = storage.truncate(mark) {
            tracing::error!(mark, error = %rollback, "failed to roll back journal batch");
            return Err(BatchError::Unrecoverable(err.into()));
        }
        return Err(BatchError::RolledBack(err.into()));
    }

    Ok(Written {
        ends,
        rows: frames.len(),
        bytes: frames.iter().map(Vec::len).sum(),
    })
}
