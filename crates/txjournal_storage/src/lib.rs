//! # txjournal storage
//!
//! Append-only byte stores used by the live journal backend.
//!
//! A store knows nothing about journal frames, row headers or sequence
//! numbers. The journal encodes rows into frames and hands the bytes
//! down; recovery reads the same bytes back and decodes them.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - ephemeral, for tests and `wal_mode = none` style runs
//! - [`FileBackend`] - a single journal file on the local file system
//! - [`FaultyBackend`] - wrapper that injects write/flush failures on demand
//!
//! ## Example
//!
//! ```rust
//! use txjournal_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut store = InMemoryBackend::new();
//! let start = store.append_all(&[b"frame-1", b"frame-2"]).unwrap();
//! assert_eq!(start, 0);
//! assert_eq!(store.read_at(7, 7).unwrap(), b"frame-2");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod faulty;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use faulty::{FaultHandle, FaultyBackend};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
