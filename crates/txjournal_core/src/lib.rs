//! # txjournal core
//!
//! The write-ahead-log submission layer of a transactional storage engine.
//!
//! Transaction code never talks to a durability backend directly. It builds
//! a [`JournalEntry`], hands it to the [`submit`] / [`submit_async`] facade,
//! and the [`JournalRegistry`] dispatches it to whichever [`Journal`] is
//! active at that point of the instance lifecycle:
//!
//! 1. [`BootstrapJournal`] while a snapshot is loaded
//! 2. [`RecoveryJournal`] while the local log is replayed
//! 3. [`CounterJournal`] (`wal_mode = none`) or [`LiveJournal`] afterwards
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use txjournal_core::{txn, CounterJournal, JournalEntry, JournalRegistry, Region, RowHeader};
//!
//! let registry = JournalRegistry::new();
//! registry.install(Arc::new(CounterJournal::new(0))).unwrap();
//!
//! let region = Region::new(4096);
//! let _txn = txn::begin();
//! let mut entry = JournalEntry::new(1, &region).unwrap();
//! entry.push_row(Arc::new(RowHeader::new(b"insert".to_vec()))).unwrap();
//! entry.bind_completion(|e| assert!(e.is_success()));
//!
//! assert_eq!(registry.submit(entry).unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backends;
pub mod completion;
mod config;
mod entry;
mod error;
pub mod frame;
mod journal;
mod region;
mod registry;
mod replay;
mod row;
mod stats;
mod submit;
pub mod txn;

pub use backends::{BootstrapJournal, CounterJournal, LiveJournal, NoWriteJournal, RecoveryJournal};
pub use config::{LiveJournalConfig, WalMode};
pub use entry::{CompletionCallback, JournalEntry, JOURNAL_ENTRY_ERR};
pub use error::{JournalError, JournalResult};
pub use frame::FrameReader;
pub use journal::{write_via_async, Journal, JournalKind};
pub use region::{Region, RegionLease};
pub use registry::{
    current_journal, global, journal_is_initialized, journal_set, journal_shutdown,
    JournalRegistry,
};
pub use replay::{replay, ReplayReport};
pub use row::RowHeader;
pub use stats::{JournalStats, StatsSnapshot};
pub use submit::{submit, submit_async};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
