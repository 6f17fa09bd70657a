//! One-shot completion handles.
//!
//! The blocking `write` path suspends its caller until the backend reports
//! the entry's fate. A [`Resolver`] travels with the entry's completion
//! callback; the caller parks on the matching [`Waiter`]. Resolving consumes
//! the resolver, so an entry can only be resolved once.

use crate::error::{JournalError, JournalResult};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
enum Slot {
    Pending,
    Resolved(i64),
    Abandoned,
}

#[derive(Debug)]
struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl Shared {
    fn settle(&self, value: Slot) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Pending) {
            *slot = value;
            self.ready.notify_all();
        }
    }

    fn take(slot: &Slot) -> Option<JournalResult<i64>> {
        match slot {
            Slot::Pending => None,
            Slot::Resolved(res) => Some(Ok(*res)),
            Slot::Abandoned => {
                tracing::error!("journal entry abandoned before completion");
                Some(Err(JournalError::Abandoned))
            }
        }
    }
}

/// Creates a connected resolver/waiter pair.
#[must_use]
pub fn oneshot() -> (Resolver, Waiter) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Pending),
        ready: Condvar::new(),
    });
    (
        Resolver {
            shared: Some(Arc::clone(&shared)),
        },
        Waiter { shared },
    )
}

/// Sending half: resumes the waiter with an entry result.
#[derive(Debug)]
pub struct Resolver {
    shared: Option<Arc<Shared>>,
}

impl Resolver {
    /// Publishes `result` and wakes the waiter.
    pub fn resolve(mut self, result: i64) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Slot::Resolved(result));
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Slot::Abandoned);
        }
    }
}

/// Receiving half: parks the calling thread until resolved.
#[derive(Debug)]
pub struct Waiter {
    shared: Arc<Shared>,
}

impl Waiter {
    /// Blocks until the resolver fires.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Abandoned`] if the resolver was dropped
    /// without resolving.
    pub fn wait(self) -> JournalResult<i64> {
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = Shared::take(&slot) {
                return outcome;
            }
            self.shared.ready.wait(&mut slot);
        }
    }

    /// Like [`Waiter::wait`] but gives up after `timeout`, returning `None`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<JournalResult<i64>> {
        let mut slot = self.shared.slot.lock();
        if let Some(outcome) = Shared::take(&slot) {
            return Some(outcome);
        }
        let _ = self.shared.ready.wait_for(&mut slot, timeout);
        Shared::take(&slot)
    }

    /// Whether the resolver has fired (or been dropped).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(*self.shared.slot.lock(), Slot::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn resolves_inline() {
        let (resolver, waiter) = oneshot();
        resolver.resolve(42);
        assert!(waiter.is_settled());
        assert_eq!(waiter.wait().unwrap(), 42);
    }

    #[test]
    fn resolves_from_another_thread() {
        let (resolver, waiter) = oneshot();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            resolver.resolve(-1);
        });
        assert_eq!(waiter.wait().unwrap(), -1);
        handle.join().unwrap();
    }

    #[test]
    fn dropped_resolver_abandons() {
        let (resolver, waiter) = oneshot();
        drop(resolver);
        assert!(matches!(waiter.wait(), Err(JournalError::Abandoned)));
    }

    #[test]
    fn timeout_leaves_waiter_usable() {
        let (resolver, waiter) = oneshot();
        assert!(waiter.wait_timeout(Duration::from_millis(5)).is_none());
        resolver.resolve(7);
        assert_eq!(waiter.wait_timeout(Duration::ZERO).unwrap().unwrap(), 7);
    }
}
