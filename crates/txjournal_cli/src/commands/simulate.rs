//! Simulate command implementation.
//!
//! Walks the process-wide journal through the instance lifecycle against a
//! journal file: bootstrap, recovery by replaying the file, then either a
//! counter (`--wal-mode none`) or a live writer appending to the same file.

use std::path::Path;
use std::sync::Arc;
use txjournal_core::{
    global, journal_set, journal_shutdown, replay, submit, txn, BootstrapJournal, CounterJournal,
    JournalEntry, JournalError, LiveJournal, LiveJournalConfig, RecoveryJournal, Region,
    RowHeader, StatsSnapshot, WalMode,
};
use txjournal_storage::{FileBackend, StorageBackend};

/// What a simulation did.
#[derive(Debug, Default)]
pub struct SimulationReport {
    /// Rows replayed from the file.
    pub replayed: u64,
    /// Bytes of partial frame cut from the file's tail.
    pub truncated: u64,
    /// Entries that completed successfully.
    pub submitted: usize,
    /// Entries that completed with a failure result.
    pub failed: usize,
    /// Signature after the last entry.
    pub signature: i64,
    /// Writer counters, in a durable mode.
    pub stats: Option<StatsSnapshot>,
}

/// Runs the simulate command.
pub fn run(
    path: &Path,
    entries: usize,
    rows: usize,
    mode: WalMode,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Simulating {} entries of {} row(s) at {:?} (wal mode {})",
        entries, rows, path, mode
    );
    println!();

    let report = simulate(path, entries, rows, mode)?;

    println!("  replayed rows: {}", report.replayed);
    if report.truncated > 0 {
        println!("  truncated tail: {} bytes", report.truncated);
    }
    println!("  submitted: {}, failed: {}", report.submitted, report.failed);
    if let Some(stats) = report.stats {
        println!(
            "  batches: {}, rows written: {}, bytes written: {}",
            stats.batches, stats.rows, stats.bytes
        );
    }
    println!("  signature: {}", report.signature);
    Ok(())
}

enum Active {
    Counter(Arc<CounterJournal>),
    Live(Arc<LiveJournal>),
}

impl Active {
    fn signature(&self) -> i64 {
        match self {
            Self::Counter(journal) => journal.signature(),
            Self::Live(journal) => journal.signature(),
        }
    }
}

fn simulate(
    path: &Path,
    entries: usize,
    rows: usize,
    mode: WalMode,
) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let mut report = SimulationReport::default();

    journal_shutdown();
    journal_set(Arc::new(BootstrapJournal::new()))?;

    let mut store = FileBackend::open_with_create_dirs(path)?;
    let recovery = Arc::new(RecoveryJournal::new(0));
    journal_set(recovery.clone())?;
    let replayed = match replay(global(), &store) {
        Ok(replayed) => replayed,
        Err(err) => {
            journal_shutdown();
            return Err(err.into());
        }
    };
    report.replayed = replayed.rows;

    let size = store.size()?;
    if replayed.end_offset + replayed.torn_tail != size {
        journal_shutdown();
        return Err(format!(
            "journal has {} unexplained bytes after offset {}",
            size.saturating_sub(replayed.end_offset + replayed.torn_tail),
            replayed.end_offset
        )
        .into());
    }
    report.truncated = replayed.torn_tail;
    if report.truncated > 0 {
        tracing::warn!(
            bytes = report.truncated,
            offset = replayed.end_offset,
            "truncating partial frame at journal tail"
        );
        store.truncate(replayed.end_offset)?;
    }

    let signature = recovery.signature();
    let active = if mode.is_durable() {
        let config = LiveJournalConfig::for_mode(mode).start_lsn(signature);
        let live = Arc::new(LiveJournal::start(Box::new(store), config)?);
        journal_set(live.clone())?;
        Active::Live(live)
    } else {
        let counter = Arc::new(CounterJournal::new(signature));
        journal_set(counter.clone())?;
        Active::Counter(counter)
    };
    tracing::info!(signature, journal = %mode, "journal is live");

    let region = Region::unbounded();
    let _txn = txn::begin();
    for i in 0..entries {
        let mut entry = JournalEntry::new(rows, &region)?;
        for j in 0..rows {
            let body = format!("entry {i} row {j}").into_bytes();
            entry.push_row(Arc::new(RowHeader::new(body)))?;
        }
        entry.bind_completion(|_| {});

        match submit(entry) {
            Ok(_) => report.submitted += 1,
            Err(JournalError::WriteFailed { result }) => {
                tracing::warn!(entry = i, result, "entry failed");
                report.failed += 1;
            }
            Err(err) => {
                journal_shutdown();
                return Err(err.into());
            }
        }
    }

    // Shutdown joins the writer, so stats are final afterwards.
    journal_shutdown();
    report.signature = active.signature();
    if let Active::Live(live) = &active {
        report.stats = Some(live.stats());
    }
    Ok(report)
}
