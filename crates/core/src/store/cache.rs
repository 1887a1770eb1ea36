//! Populate-once cache with request coalescing
//!
//! Each key owns a slot holding a `OnceLock`. The map lock is only held while
//! the slot is looked up or inserted; the (possibly slow) load runs on the
//! slot itself, so concurrent requests for the same key block on one loader
//! call and share its result, while requests for other keys proceed.
//! Errors are cached like values and are never retried.
//!
//! A thread waiting inside `load` must never pick up another request for the
//! same key: a rayon worker blocked in a parallel loop inside `load` can
//! steal such a task and would then wait on its own slot. Keys read from
//! inside a rayon pool are filled from outside it first.

use crate::error::ForegroundError;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type Slot<V> = Arc<OnceLock<Result<Arc<V>, ForegroundError>>>;

/// Shared cache mapping keys to lazily loaded, immutable values
pub struct CoalescingCache<K, V> {
    slots: Mutex<FxHashMap<K, Slot<V>>>,
}

impl<K, V> Default for CoalescingCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<K, V> CoalescingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `load` if it is absent
    ///
    /// At most one `load` runs per key; other callers wait for it.
    ///
    /// # Errors
    /// Returns the (cached) error produced by the first `load` for this key.
    pub fn get_or_load<F>(&self, key: &K, load: F) -> Result<Arc<V>, ForegroundError>
    where
        F: FnOnce() -> Result<V, ForegroundError>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        slot.get_or_init(|| load().map(Arc::new)).clone()
    }

    /// Whether a completed entry exists for `key`
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).is_some_and(|slot| slot.get().is_some())
    }

    /// Number of keys seen so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict every entry
    ///
    /// Loads already in flight complete for their waiting callers but are not
    /// kept.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_value_is_loaded_once() {
        let cache: CoalescingCache<u32, String> = CoalescingCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = cache
                .get_or_load(&7, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("seven".to_string())
                })
                .unwrap();
            assert_eq!(v.as_str(), "seven");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_cached() {
        let cache: CoalescingCache<&'static str, u8> = CoalescingCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let err = cache
                .get_or_load(&"missing", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ForegroundError::not_found("missing", "absent"))
                })
                .unwrap_err();
            assert!(matches!(err, ForegroundError::DataNotFound { .. }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_requests_coalesce() {
        let cache: CoalescingCache<u8, u64> = CoalescingCache::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    let v = cache
                        .get_or_load(&1, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(99)
                        })
                        .unwrap();
                    assert_eq!(*v, 99);
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_forces_reload() {
        let cache: CoalescingCache<u8, u8> = CoalescingCache::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        };
        cache.get_or_load(&0, load).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_load(&0, load).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
