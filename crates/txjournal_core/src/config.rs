//! Journal configuration.

use std::fmt;
use std::str::FromStr;

/// How the instance logs after recovery completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalMode {
    /// Nothing is written; a counter fakes sequence numbers.
    None,
    /// Frames are written and flushed to the OS.
    #[default]
    Write,
    /// Frames are written and synced to stable storage per batch.
    Fsync,
}

impl WalMode {
    /// Whether this mode runs a live writer.
    #[must_use]
    pub const fn is_durable(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for WalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Write => "write",
            Self::Fsync => "fsync",
        })
    }
}

impl FromStr for WalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "write" => Ok(Self::Write),
            "fsync" => Ok(Self::Fsync),
            other => Err(format!("unknown wal mode '{other}'")),
        }
    }
}

/// Configuration for [`crate::LiveJournal`].
#[derive(Debug, Clone)]
pub struct LiveJournalConfig {
    /// Maximum number of entries waiting for the writer thread.
    pub queue_capacity: usize,

    /// Soft cap on the approximate size of one write batch.
    pub max_batch_bytes: usize,

    /// Whether to sync storage after every batch (safer but slower).
    pub sync_on_write: bool,

    /// Replica id stamped on every written row.
    pub replica_id: u32,

    /// Signature the writer continues from, usually the one recovery
    /// ended at.
    pub start_lsn: i64,
}

impl Default for LiveJournalConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_batch_bytes: 1024 * 1024, // 1 MB
            sync_on_write: false,
            replica_id: 1,
            start_lsn: 0,
        }
    }
}

impl LiveJournalConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a configuration from a [`WalMode`].
    #[must_use]
    pub fn for_mode(mode: WalMode) -> Self {
        Self::default().sync_on_write(mode == WalMode::Fsync)
    }

    /// Sets the queue capacity. Zero is raised to one: the writer needs a
    /// slot to hand entries over.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Sets the batch size cap.
    #[must_use]
    pub const fn max_batch_bytes(mut self, bytes: usize) -> Self {
        self.max_batch_bytes = bytes;
        self
    }

    /// Sets whether to sync after every batch.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the replica id.
    #[must_use]
    pub const fn replica_id(mut self, id: u32) -> Self {
        self.replica_id = id;
        self
    }

    /// Sets the starting signature.
    #[must_use]
    pub const fn start_lsn(mut self, lsn: i64) -> Self {
        self.start_lsn = lsn;
        self
    }
}
