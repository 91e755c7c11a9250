use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::memo::{Config, Stats};

/// A memoizer that can be shared between threads.
///
/// Lookups take a shared lock. On a miss, the caller claims the key by
/// inserting an empty once-cell under the exclusive lock and then runs the
/// function with no lock held. Two threads asking for the same key never
/// both run the function, a stored value is never overwritten, and misses on
/// different keys run in parallel. The function may call back into the same
/// memoizer, but not for the key it is computing.
pub struct SyncMemo<K, V> {
    /// A cell is empty while its value is being computed.
    map: RwLock<FxHashMap<K, Arc<OnceLock<V>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    config: Config,
}

impl<K, V> SyncMemo<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Create an empty memoizer.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty memoizer with custom settings.
    pub fn with_config(config: Config) -> Self {
        Self {
            map: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            config,
        }
    }

    /// Return the cached value for `key` or compute, store and return it.
    pub fn get_or_compute<F>(&self, key: K, func: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        let name = self.config.name;

        if !self.config.enabled {
            debug!(memo = name, ?key, "bypass");
            self.misses.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "testing")]
            crate::testing::register_miss();

            return func(&key);
        }

        let cell = self.map.read().get(&key).cloned();
        if let Some(value) = cell.as_deref().and_then(OnceLock::get) {
            return self.hit(&key, value);
        }

        let cell = match cell {
            Some(cell) => cell,
            None => Arc::clone(self.map.write().entry(key.clone()).or_default()),
        };

        // Racing callers for the same key block here until the first one
        // has stored its value.
        let mut ran = false;
        let value = cell.get_or_init(|| {
            ran = true;
            func(&key)
        });

        if !ran {
            return self.hit(&key, value);
        }

        debug!(memo = name, ?key, "miss");
        self.misses.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        value.clone()
    }

    fn hit(&self, key: &K, value: &V) -> V {
        trace!(memo = self.config.name, ?key, "hit");
        self.hits.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "testing")]
        crate::testing::register_hit();

        value.clone()
    }
}

impl<K, V> SyncMemo<K, V>
where
    K: Hash + Eq,
{
    /// Whether a value for `key` is cached.
    pub fn contains(&self, key: &K) -> bool {
        self.map.read().get(key).is_some_and(|cell| cell.get().is_some())
    }

    /// The number of cached values.
    pub fn len(&self) -> usize {
        self.map.read().values().filter(|cell| cell.get().is_some()).count()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for SyncMemo<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Debug for SyncMemo<K, V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("SyncMemo")
            .field("name", &self.config.name)
            .field("cells", &self.map.read().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    #[test]
    fn test_sync_memo_basic() {
        let memo = SyncMemo::new();
        assert_eq!(memo.get_or_compute((2, 3), |&(a, b)| a + b), 5);
        assert_eq!(memo.get_or_compute((2, 3), |_| unreachable!()), 5);
        assert_eq!(memo.get_or_compute((3, 2), |&(a, b)| a + b), 5);
        assert_eq!(memo.len(), 2);
        assert!(memo.contains(&(3, 2)));
        assert_eq!(memo.stats(), Stats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_sync_memo_keeps_first_value() {
        let memo = SyncMemo::new();
        assert_eq!(memo.get_or_compute("key", |_| 1), 1);
        assert_eq!(memo.get_or_compute("key", |_| 2), 1);
    }

    #[test]
    fn test_sync_memo_disabled() {
        let memo = SyncMemo::with_config(Config { enabled: false, ..Config::default() });
        assert_eq!(memo.get_or_compute(1, |_| 'a'), 'a');
        assert_eq!(memo.get_or_compute(1, |_| 'b'), 'b');
        assert!(memo.is_empty());
        assert_eq!(memo.stats().misses, 2);
    }

    #[test]
    fn test_sync_memo_computes_each_key_once() {
        let memo = Arc::new(SyncMemo::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let runs = Arc::clone(&runs);
                thread::spawn(move || {
                    for i in 0..200u64 {
                        let key = (i % 16, i % 3);
                        let value = memo.get_or_compute(key, |&(a, b)| {
                            runs.fetch_add(1, Ordering::SeqCst);
                            a + b
                        });
                        assert_eq!(value, key.0 + key.1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), memo.len());
        assert_eq!(memo.stats().misses, memo.len());
        assert_eq!(memo.stats().calls(), 8 * 200);
    }

    #[test]
    fn test_sync_memo_unrelated_misses_overlap() {
        let memo = SyncMemo::new();
        let barrier = Barrier::new(2);

        // Each computation waits for the other one to start. If misses on
        // different keys were serialized, this would never finish.
        thread::scope(|scope| {
            for key in [1, 2] {
                let memo = &memo;
                let barrier = &barrier;
                scope.spawn(move || {
                    memo.get_or_compute(key, |&k| {
                        barrier.wait();
                        k * 10
                    })
                });
            }
        });

        assert_eq!(memo.len(), 2);
        assert_eq!(memo.get_or_compute(2, |_| 0), 20);
    }

    #[test]
    fn test_sync_memo_reentrant_other_key() {
        let memo = SyncMemo::new();
        let outer = memo.get_or_compute(2u64, |&n| n + memo.get_or_compute(n - 1, |&m| m));
        assert_eq!(outer, 3);
        assert!(memo.contains(&1));
        assert_eq!(memo.stats().misses, 2);
    }
}
