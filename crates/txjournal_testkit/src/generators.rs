//! Property-based test generators using proptest.
//!
//! Provides strategies for rows, entry shapes and configurations that
//! respect the journal's invariants.

use proptest::prelude::*;
use std::sync::Arc;
use txjournal_core::{LiveJournalConfig, RowHeader, WalMode};

/// Strategy for row bodies (arbitrary bytes, possibly empty).
pub fn row_body_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// Strategy for unlogged rows.
pub fn row_strategy() -> impl Strategy<Value = Arc<RowHeader>> {
    row_body_strategy().prop_map(|body| Arc::new(RowHeader::new(body)))
}

/// Strategy for the rows of one entry, up to `max_rows` of them.
pub fn rows_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Arc<RowHeader>>> {
    prop::collection::vec(row_strategy(), 0..=max_rows)
}

/// Strategy for a sequence of entry row counts.
pub fn entry_shapes_strategy(
    max_entries: usize,
    max_rows: usize,
) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..=max_rows, 1..=max_entries)
}

/// Strategy for replayed rows: strictly increasing LSNs from `start`.
pub fn replay_rows_strategy(start: i64, max_rows: usize) -> impl Strategy<Value = Vec<RowHeader>> {
    prop::collection::vec((1i64..16, row_body_strategy()), 0..=max_rows).prop_map(move |steps| {
        let mut lsn = start;
        steps
            .into_iter()
            .map(|(step, body)| {
                lsn += step;
                RowHeader::logged(1, lsn, body)
            })
            .collect()
    })
}

/// Strategy for WAL modes.
pub fn wal_mode_strategy() -> impl Strategy<Value = WalMode> {
    prop_oneof![
        Just(WalMode::None),
        Just(WalMode::Write),
        Just(WalMode::Fsync),
    ]
}

/// Strategy for live journal configurations with small queues and batches.
pub fn live_config_strategy() -> impl Strategy<Value = LiveJournalConfig> {
    (1usize..64, 64usize..8192, 1u32..8, 0i64..1000).prop_map(
        |(queue, batch, replica, start)| {
            LiveJournalConfig::new()
                .queue_capacity(queue)
                .max_batch_bytes(batch)
                .replica_id(replica)
                .start_lsn(start)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn replay_rows_are_strictly_increasing(rows in replay_rows_strategy(10, 20)) {
            for pair in rows.windows(2) {
                prop_assert!(pair[0].lsn < pair[1].lsn);
            }
            if let Some(first) = rows.first() {
                prop_assert!(first.lsn > 10);
            }
        }

        #[test]
        fn shapes_respect_bounds(shapes in entry_shapes_strategy(8, 5)) {
            prop_assert!(!shapes.is_empty() && shapes.len() <= 8);
            prop_assert!(shapes.iter().all(|n| *n <= 5));
        }

        #[test]
        fn live_configs_are_usable(config in live_config_strategy()) {
            prop_assert!(config.queue_capacity > 0);
            prop_assert!(config.max_batch_bytes >= 64);
        }
    }
}
