//! # txjournal Testkit
//!
//! Test utilities for txjournal.
//!
//! This crate provides:
//! - Journals with scripted completion (manual, immediate, probing)
//! - Entry builders and a completion log
//! - Property-based test generators using proptest
//! - Concurrent submission stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txjournal_testkit::prelude::*;
//!
//! #[test]
//! fn deferred_failure() {
//!     let journal = ManualJournal::new();
//!     // ... submit from one thread, complete_next(-1) from another
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
