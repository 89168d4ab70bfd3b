use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks which cursor may currently execute against a session.
#[derive(Debug, Default)]
pub(crate) struct LeaseRegistry {
    next: AtomicU64,
    current: AtomicU64,
    closed: AtomicBool,
}

impl LeaseRegistry {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Issue a new lease, superseding whichever one was current.
    pub(crate) fn acquire(self: &Arc<Self>) -> Lease {
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.store(id, Ordering::SeqCst);
        Lease {
            id,
            registry: Arc::clone(self),
        }
    }

    pub(crate) fn expire_all(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.current.store(0, Ordering::SeqCst);
    }
}

/// Capability to execute statements on a session. Held by exactly one cursor.
#[derive(Debug)]
pub struct Lease {
    id: u64,
    registry: Arc<LeaseRegistry>,
}

impl Lease {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        !self.registry.closed.load(Ordering::SeqCst)
            && self.registry.current.load(Ordering::SeqCst) == self.id
    }

    /// Give the lease back if it is still the current one.
    pub fn release(&self) {
        let _ = self.registry.current.compare_exchange(
            self.id,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_lease_supersedes_older() {
        let registry = LeaseRegistry::new();
        let first = registry.acquire();
        assert!(first.is_valid());

        let second = registry.acquire();
        assert!(!first.is_valid());
        assert!(second.is_valid());

        // releasing a stale lease leaves the current one alone
        first.release();
        assert!(second.is_valid());

        second.release();
        assert!(!second.is_valid());
    }

    #[test]
    fn expire_all_invalidates_every_lease() {
        let registry = LeaseRegistry::new();
        let lease = registry.acquire();
        registry.expire_all();
        assert!(!lease.is_valid());
        assert!(!registry.acquire().is_valid());
    }
}
