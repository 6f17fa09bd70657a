//! The live journal against a real file: write, reopen, replay, continue.

use std::sync::Arc;
use std::time::Duration;
use txjournal_core::frame::FrameReader;
use txjournal_core::{
    replay, txn, JournalRegistry, LiveJournal, LiveJournalConfig, RecoveryJournal, WalMode,
};
use txjournal_storage::StorageBackend;
use txjournal_testkit::prelude::*;

fn live_on(file: &TempJournalFile, start_lsn: i64) -> Arc<LiveJournal> {
    let config = LiveJournalConfig::for_mode(WalMode::Fsync).start_lsn(start_lsn);
    Arc::new(LiveJournal::start(Box::new(file.open()), config).unwrap())
}

#[test]
fn entries_survive_restart_and_lsns_continue() {
    let file = TempJournalFile::new();

    {
        let registry = JournalRegistry::new();
        registry.install(live_on(&file, 0)).unwrap();
        let _txn = txn::begin();
        assert_eq!(registry.submit(bound_entry(2)).unwrap(), 2);
        assert_eq!(registry.submit(bound_entry(3)).unwrap(), 5);
        registry.shutdown();
    }

    let registry = JournalRegistry::new();
    let recovery = Arc::new(RecoveryJournal::new(0));
    registry.install(recovery.clone()).unwrap();
    let report = replay(&registry, &file.open()).unwrap();
    assert_eq!(report.rows, 5);
    assert_eq!(recovery.signature(), 5);

    let live = live_on(&file, recovery.signature());
    registry.install(live.clone()).unwrap();
    let _txn = txn::begin();
    assert_eq!(registry.submit(bound_entry(1)).unwrap(), 6);
    registry.shutdown();

    let store = file.open();
    let lsns: Vec<i64> = FrameReader::new(&store, 0)
        .unwrap()
        .map(|frame| frame.unwrap().1.lsn)
        .collect();
    assert_eq!(lsns, vec![1, 2, 3, 4, 5, 6]);
    assert!(!live.is_open());
}

#[test]
fn async_submissions_complete_in_order_on_writer_thread() {
    let file = TempJournalFile::new();
    let live = live_on(&file, 100);
    let registry = JournalRegistry::with_journal(live.clone());
    let log = ResultLog::new();
    let _txn = txn::begin();

    for _ in 0..50 {
        registry.submit_async(bound_entry(1), log.callback()).unwrap();
    }
    assert!(log.wait_for(50, Duration::from_secs(10)));

    let results = log.results();
    assert_eq!(results.first(), Some(&101));
    assert!(results.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(live.signature(), 150);
    assert_eq!(live.stats().entries, 50);

    registry.shutdown();
    assert_eq!(file.open().size().unwrap(), live.stats().bytes);
}

#[test]
fn concurrent_blocking_writers_get_distinct_lsns() {
    let file = TempJournalFile::new();
    let live = live_on(&file, 0);
    let registry = JournalRegistry::with_journal(live.clone());

    let result = stress_blocking_submit(
        &registry,
        &StressConfig {
            threads: 4,
            entries_per_thread: 50,
            rows_per_entry: 2,
        },
    );
    assert_eq!(result.successful_ops, 200);
    assert!(result.monotone);
    assert_eq!(live.signature(), 400);

    registry.shutdown();
}
