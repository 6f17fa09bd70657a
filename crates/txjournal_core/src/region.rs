//! Scoped allocation budget for journal entries.
//!
//! A [`Region`] models the per-transaction arena entries are carved from:
//! allocations only ever bump `used`, and the bytes come back all at once
//! through [`Region::reclaim`]. Every allocation hands out a
//! [`RegionLease`]; reclaiming while any lease is alive is refused, which is
//! how the "entry outlives its completion" rule is checked at runtime.

use crate::error::{JournalError, JournalResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct RegionInner {
    capacity: usize,
    used: AtomicUsize,
    outstanding: AtomicUsize,
}

/// Cloneable handle to a scoped arena budget.
#[derive(Debug, Clone)]
pub struct Region {
    inner: Arc<RegionInner>,
}

impl Region {
    /// Creates a region that can hand out at most `capacity` bytes between
    /// reclaims.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RegionInner {
                capacity,
                used: AtomicUsize::new(0),
                outstanding: AtomicUsize::new(0),
            }),
        }
    }

    /// Creates a region with no practical limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Charges `size` bytes against the region.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::OutOfMemory`] if fewer than `size` bytes are
    /// left.
    pub fn alloc(&self, size: usize) -> JournalResult<RegionLease> {
        let capacity = self.inner.capacity;
        self.inner
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|next| *next <= capacity)
            })
            .map_err(|used| JournalError::OutOfMemory {
                requested: size,
                available: capacity.saturating_sub(used),
            })?;

        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        Ok(RegionLease {
            region: Arc::clone(&self.inner),
            size,
        })
    }

    /// Bytes charged since the last reclaim.
    #[must_use]
    pub fn used(&self) -> usize {
        self.inner.used.load(Ordering::Acquire)
    }

    /// Total budget.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of leases still alive.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Returns every charged byte to the region.
    ///
    /// Returns the number of bytes released.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::RegionBusy`] while any lease is alive: an
    /// entry still owned by a backend must not have its memory reused.
    pub fn reclaim(&self) -> JournalResult<usize> {
        let outstanding = self.outstanding();
        if outstanding > 0 {
            return Err(JournalError::RegionBusy { outstanding });
        }
        Ok(self.inner.used.swap(0, Ordering::AcqRel))
    }
}

/// Proof that a chunk of a [`Region`] is in use.
///
/// Dropping the lease does not return its bytes (that happens on
/// reclaim), it only marks the allocation as no longer referenced.
#[derive(Debug)]
pub struct RegionLease {
    region: Arc<RegionInner>,
    size: usize,
}

impl RegionLease {
    /// Size charged for this lease.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for RegionLease {
    fn drop(&mut self) {
        self.region.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_until_exhausted() {
        let region = Region::new(100);
        let a = region.alloc(60).unwrap();
        assert_eq!(a.size(), 60);
        assert_eq!(region.used(), 60);

        let err = region.alloc(41).unwrap_err();
        assert!(matches!(
            err,
            JournalError::OutOfMemory {
                requested: 41,
                available: 40
            }
        ));
        // A failed alloc charges nothing.
        assert_eq!(region.used(), 60);
        let _b = region.alloc(40).unwrap();
        assert_eq!(region.outstanding(), 2);
    }

    #[test]
    fn reclaim_waits_for_leases() {
        let region = Region::new(64);
        let lease = region.alloc(16).unwrap();
        assert!(matches!(
            region.reclaim(),
            Err(JournalError::RegionBusy { outstanding: 1 })
        ));

        drop(lease);
        // Bytes stay charged until reclaim.
        assert_eq!(region.used(), 16);
        assert_eq!(region.reclaim().unwrap(), 16);
        assert_eq!(region.used(), 0);
    }

    #[test]
    fn unbounded_does_not_overflow() {
        let region = Region::unbounded();
        let _a = region.alloc(usize::MAX - 1).unwrap();
        assert!(region.alloc(2).is_err());
    }
}
