//! Per-request-id serialization.
//!
//! Operations mutating the same request id must not interleave; operations
//! on different ids are independent. The registry hands out one mutex per
//! request id, created lazily and held for the length of an operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chantier_core::RequestId;

#[derive(Debug, Default)]
pub struct RequestLocks {
    inner: Mutex<HashMap<RequestId, Arc<Mutex<()>>>>,
}

impl RequestLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutex for a request id. Lock the returned handle for the duration of
    /// the operation.
    pub fn acquire(&self, id: RequestId) -> Arc<Mutex<()>> {
        // A poisoned registry only means a holder panicked; the map itself
        // stays usable.
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(id).or_default().clone()
    }
}

/// Lock a per-request mutex handed out by [`RequestLocks::acquire`],
/// recovering from poisoning.
pub fn hold(handle: &Mutex<()>) -> MutexGuard<'_, ()> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_shares_one_mutex() {
        let locks = RequestLocks::new();
        let id = RequestId::new();
        let a = locks.acquire(id);
        let b = locks.acquire(id);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_ids_get_independent_mutexes() {
        let locks = RequestLocks::new();
        let a = locks.acquire(RequestId::new());
        let b = locks.acquire(RequestId::new());
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
