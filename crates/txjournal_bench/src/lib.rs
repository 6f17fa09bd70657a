//! Benchmark utilities.

use std::sync::Arc;
use txjournal_core::{JournalEntry, Region, RowHeader};

/// Deterministic row body of the specified size.
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// A filled entry with `rows` rows of `body_size` bytes and a no-op
/// completion bound.
///
/// # Panics
///
/// Panics if `region` is exhausted.
pub fn entry(rows: usize, body_size: usize, region: &Region) -> JournalEntry {
    let mut entry = JournalEntry::new(rows, region).expect("bench region exhausted");
    for _ in 0..rows {
        entry
            .push_row(Arc::new(RowHeader::new(payload(body_size))))
            .expect("entry sized for rows");
    }
    entry.bind_completion(|_| {});
    entry
}
