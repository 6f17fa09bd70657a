//! Tests against the process-wide registry. They share one slot, so they
//! run serially and always leave it shut down.

use serial_test::serial;
use std::sync::Arc;
use txjournal_core::{
    current_journal, journal_is_initialized, journal_set, journal_shutdown, submit, submit_async,
    txn, BootstrapJournal, CounterJournal, JournalError, JournalKind, RecoveryJournal,
};
use txjournal_testkit::prelude::*;

#[test]
#[serial(global_journal)]
fn fresh_slot_rejects_submissions() {
    journal_shutdown();
    assert!(!journal_is_initialized());
    assert_eq!(current_journal().kind(), JournalKind::Unset);

    let _txn = txn::begin();
    assert!(matches!(
        submit(bound_entry(1)),
        Err(JournalError::NotInitialized)
    ));
}

#[test]
#[serial(global_journal)]
fn full_lifecycle_through_global_facade() {
    journal_shutdown();
    let _txn = txn::begin();

    journal_set(Arc::new(BootstrapJournal::new())).unwrap();
    assert_eq!(submit(bound_entry(2)).unwrap(), 0);

    let recovery = Arc::new(RecoveryJournal::new(0));
    journal_set(recovery.clone()).unwrap();
    let mut replayed = filled_entry(0, &txjournal_core::Region::unbounded());
    replayed.bind_completion(|_| {});
    assert_eq!(submit(replayed).unwrap(), 0);

    journal_set(Arc::new(CounterJournal::new(recovery.signature()))).unwrap();
    let log = ResultLog::new();
    submit_async(bound_entry(1), log.callback()).unwrap();
    submit_async(bound_entry(1), log.callback()).unwrap();
    assert_eq!(log.results(), vec![1, 2]);
    assert_eq!(current_journal().kind(), JournalKind::Disabled);

    journal_shutdown();
    assert!(!journal_is_initialized());
}

#[test]
#[serial(global_journal)]
fn global_swap_destroys_previous_journal() {
    journal_shutdown();
    let first = Arc::new(CountingJournal::new("first"));
    journal_set(first.clone()).unwrap();
    journal_set(Arc::new(CountingJournal::new("second"))).unwrap();

    assert_eq!(first.destroys(), 1);
    assert_eq!(current_journal().name(), "second");

    journal_shutdown();
}
