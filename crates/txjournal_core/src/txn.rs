//! Transaction context marker.
//!
//! Journal submission is only legal from inside an open transaction. The
//! transaction layer opens a [`TxnGuard`] on the thread running the
//! transaction; the submission facade asserts one is open.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as running a transaction until dropped.
///
/// Guards nest. The guard is tied to its thread and cannot be sent.
#[derive(Debug)]
pub struct TxnGuard {
    _not_send: PhantomData<*const ()>,
}

/// Opens a transaction context on the current thread.
#[must_use = "the transaction context closes when the guard is dropped"]
pub fn begin() -> TxnGuard {
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    TxnGuard {
        _not_send: PhantomData,
    }
}

/// Whether the current thread is inside a transaction.
#[must_use]
pub fn in_txn() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

impl Drop for TxnGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
