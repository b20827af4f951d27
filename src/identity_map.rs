//! Identity map keyed by resource href.
//!
//! The identity map guarantees at most one live instance per key. Concurrent
//! callers asking for the same missing key race for a per-key slot; exactly
//! one of them runs the factory while the others wait for its result and
//! receive the same instance.
//!
//! Entries expire on a sliding window reset on every access, unless they were
//! added with `store_infinitely`. An expired entry is replaced by a fresh
//! instance; the old instance is left untouched for whoever still holds it.
//!
//! # Example Usage
//!
//! ```rust
//! use idm_client::identity_map::IdentityMap;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let map: IdentityMap<Arc<String>> = IdentityMap::new(Duration::from_secs(10));
//! let a = map.get_or_add("https://api.example.com/v1/accounts/1", || Arc::new("a".into()), false).unwrap();
//! let b = map.get_or_add("https://api.example.com/v1/accounts/1", || Arc::new("b".into()), false).unwrap();
//!
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(map.lifetime_items_added(), 1);
//! ```

use crate::error::{SdkError, SdkResult};
use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

struct Entry<V> {
    slot: Arc<OnceLock<V>>,
    store_infinitely: bool,
    last_access: Instant,
}

/// Process-wide map from href to a single shared instance.
pub struct IdentityMap<V: Clone> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    sliding_expiration: Duration,
    last_sweep: Mutex<Instant>,
    lifetime_items_added: AtomicU64,
    disposed: AtomicBool,
}

impl<V: Clone> IdentityMap<V> {
    /// Create a map whose entries expire after `sliding_expiration` without access.
    pub fn new(sliding_expiration: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sliding_expiration,
            last_sweep: Mutex::new(Instant::now()),
            lifetime_items_added: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Return the instance stored under `key`, creating it with `factory` if absent.
    ///
    /// The factory runs at most once per key while the entry is live, and
    /// outside the map lock so it may itself use the map.
    ///
    /// # Errors
    /// Returns [`SdkError::Disposed`] after [`dispose`](Self::dispose).
    pub fn get_or_add<F>(&self, key: &str, factory: F, store_infinitely: bool) -> SdkResult<V>
    where
        F: FnOnce() -> V,
    {
        self.ensure_live()?;

        let slot = {
            let mut entries = self.entries.lock();
            let now = Instant::now();
            self.sweep(&mut entries, now);

            let expired = entries
                .get(key)
                .is_some_and(|entry| self.is_expired(entry, now));
            if expired {
                trace!("Identity map entry for {} expired", key);
                entries.remove(key);
            }

            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                slot: Arc::new(OnceLock::new()),
                store_infinitely,
                last_access: now,
            });
            entry.last_access = now;
            entry.store_infinitely |= store_infinitely;
            Arc::clone(&entry.slot)
        };

        let value = slot.get_or_init(|| {
            self.lifetime_items_added.fetch_add(1, Ordering::Relaxed);
            debug!("Identity map materializing {}", key);
            factory()
        });
        Ok(value.clone())
    }

    /// The live instance for `key`, if any.
    pub fn get(&self, key: &str) -> SdkResult<Option<V>> {
        self.ensure_live()?;
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(entry) => self.is_expired(entry, now),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get_mut(key).and_then(|entry| {
            entry.last_access = now;
            entry.slot.get().cloned()
        }))
    }

    /// Drop the entry for `key`, returning the instance it held.
    pub fn remove(&self, key: &str) -> SdkResult<Option<V>> {
        self.ensure_live()?;
        Ok(self
            .entries
            .lock()
            .remove(key)
            .and_then(|entry| entry.slot.get().cloned()))
    }

    /// Number of entries currently held. Expired entries count until the
    /// next sweep, which runs at most once per expiration window on insert.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of factory invocations over the map's lifetime.
    pub fn lifetime_items_added(&self) -> u64 {
        self.lifetime_items_added.load(Ordering::Relaxed)
    }

    /// Release every entry. All later calls fail with [`SdkError::Disposed`].
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.entries.lock().clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> SdkResult<()> {
        if self.is_disposed() {
            Err(SdkError::Disposed {
                component: "IdentityMap",
            })
        } else {
            Ok(())
        }
    }

    /// Drop every expired entry, at most once per expiration window.
    fn sweep(&self, entries: &mut HashMap<String, Entry<V>>, now: Instant) {
        let mut last_sweep = self.last_sweep.lock();
        if now.saturating_duration_since(*last_sweep) < self.sliding_expiration {
            return;
        }
        *last_sweep = now;

        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        let swept = before - entries.len();
        if swept > 0 {
            trace!("Identity map swept {} expired entries", swept);
        }
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        !entry.store_infinitely
            && now.saturating_duration_since(entry.last_access) > self.sliding_expiration
    }
}

impl<V: Clone> std::fmt::Debug for IdentityMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityMap")
            .field("entries", &self.len())
            .field("sliding_expiration", &self.sliding_expiration)
            .field("lifetime_items_added", &self.lifetime_items_added())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    const KEY: &str = "https://api.example.com/v1/accounts/1";

    #[test]
    fn test_factory_runs_once_per_key() {
        let map = IdentityMap::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = map
            .get_or_add(
                KEY,
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Arc::new(1)
                },
                false,
            )
            .unwrap();
        let second = map
            .get_or_add(
                KEY,
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Arc::new(2)
                },
                false,
            )
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(map.lifetime_items_added(), 1);
    }

    #[test]
    fn test_concurrent_get_or_add_returns_one_instance() {
        const THREADS: usize = 16;
        let map = Arc::new(IdentityMap::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let map = Arc::clone(&map);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    map.get_or_add(
                        KEY,
                        || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Arc::new(i)
                        },
                        false,
                    )
                    .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(map.lifetime_items_added(), 1);
    }

    #[test]
    fn test_expired_entries_are_replaced() {
        let map = IdentityMap::new(Duration::from_millis(20));
        let first = map.get_or_add(KEY, || Arc::new(1), false).unwrap();

        thread::sleep(Duration::from_millis(50));

        let second = map.get_or_add(KEY, || Arc::new(2), false).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
        assert_eq!(map.lifetime_items_added(), 2);
    }

    #[test]
    fn test_insert_sweeps_expired_entries() {
        let map = IdentityMap::new(Duration::from_millis(50));
        for i in 0..1000 {
            map.get_or_add(&format!("{}/{}", KEY, i), || Arc::new(i), false)
                .unwrap();
        }
        map.get_or_add("pinned", || Arc::new(-1), true).unwrap();
        assert_eq!(map.len(), 1001);

        thread::sleep(Duration::from_millis(120));
        map.get_or_add(KEY, || Arc::new(0), false).unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.get("pinned").unwrap().is_some());
    }

    #[test]
    fn test_access_slides_the_window() {
        let map = IdentityMap::new(Duration::from_millis(80));
        let first = map.get_or_add(KEY, || Arc::new(1), false).unwrap();

        for _ in 0..4 {
            thread::sleep(Duration::from_millis(30));
            let again = map.get_or_add(KEY, || Arc::new(2), false).unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
    }

    #[test]
    fn test_store_infinitely_never_expires() {
        let map = IdentityMap::new(Duration::from_millis(10));
        let first = map.get_or_add(KEY, || Arc::new(1), true).unwrap();

        thread::sleep(Duration::from_millis(40));

        let second = map.get_or_add(KEY, || Arc::new(2), false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_remove_and_get() {
        let map = IdentityMap::new(Duration::from_secs(60));
        map.get_or_add(KEY, || Arc::new(7), false).unwrap();

        assert_eq!(map.get(KEY).unwrap().as_deref(), Some(&7));
        assert_eq!(map.remove(KEY).unwrap().as_deref(), Some(&7));
        assert!(map.get(KEY).unwrap().is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_use_after_dispose_fails() {
        let map = IdentityMap::new(Duration::from_secs(60));
        map.get_or_add(KEY, || Arc::new(1), false).unwrap();
        map.dispose();

        assert!(map.is_empty());
        let error = map.get_or_add(KEY, || Arc::new(2), false).unwrap_err();
        assert!(matches!(error, SdkError::Disposed { .. }));
        assert!(map.get(KEY).is_err());
    }
}
