use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::memo::Stats;

/// The cache of a single `#[memoize]` function.
///
/// Keys are 128-bit hashes of the argument tuple, so borrowed arguments can
/// be cached without storing them. Each key owns a once-cell: the first
/// caller runs the function, concurrent callers with the same arguments wait
/// for its result, and callers with other arguments are not blocked.
pub struct FnCache<Out>(LazyLock<CacheData<Out>>);

impl<Out: 'static> FnCache<Out> {
    /// Create an empty cache. Usable in a `static`.
    pub const fn new() -> Self {
        Self(LazyLock::new(CacheData::default))
    }

    /// The number of cached results.
    pub fn len(&self) -> usize {
        self.0.map.read().values().filter(|cell| cell.get().is_some()).count()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.0.hits.load(Ordering::Relaxed),
            misses: self.0.misses.load(Ordering::Relaxed),
        }
    }
}

impl<Out: 'static> Default for FnCache<Out> {
    fn default() -> Self {
        Self::new()
    }
}

/// The internal data for a cache.
pub struct CacheData<Out> {
    /// Maps from argument hashes to memoized results. A cell is empty while
    /// its result is being computed.
    map: RwLock<FxHashMap<u128, Arc<OnceLock<Out>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<Out> Default for CacheData<Out> {
    fn default() -> Self {
        Self {
            map: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

/// Executes a function, trying to use a cached result for it.
pub fn memoized<In, Out, F>(cache: &FnCache<Out>, name: &'static str, input: In, func: F) -> Out
where
    In: Hash,
    Out: Clone + 'static,
    F: FnOnce(In) -> Out,
{
    let data = &*cache.0;
    let key = crate::hash::hash(&input);

    let cell = data.map.read().get(&key).cloned();
    if let Some(output) = cell.as_deref().and_then(OnceLock::get) {
        return hit(data, name, key, output);
    }

    // Claim the key under the write lock, then compute without holding it so
    // that recursive calls with other arguments can use the cache.
    let cell = match cell {
        Some(cell) => cell,
        None => Arc::clone(data.map.write().entry(key).or_default()),
    };

    let mut ran = false;
    let output = cell.get_or_init(|| {
        ran = true;
        func(input)
    });

    if !ran {
        return hit(data, name, key, output);
    }

    debug!(function = name, key = ?key, "miss");
    data.misses.fetch_add(1, Ordering::Relaxed);

    #[cfg(feature = "testing")]
    crate::testing::register_miss();

    output.clone()
}

fn hit<Out: Clone>(data: &CacheData<Out>, name: &'static str, key: u128, output: &Out) -> Out {
    trace!(function = name, key = ?key, "hit");
    data.hits.fetch_add(1, Ordering::Relaxed);

    #[cfg(feature = "testing")]
    crate::testing::register_hit();

    output.clone()
}

/// Ensure a type is suitable as an argument of a memoized function.
pub fn assert_hashable<T: Hash + ?Sized>() {}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;

    static SQUARES: FnCache<u64> = FnCache::new();

    #[test]
    fn test_fn_cache() {
        let square = |x: u64| memoized(&SQUARES, "square", (x,), |(x,)| x * x);
        assert_eq!(square(3), 9);
        assert_eq!(square(3), 9);
        assert_eq!(square(4), 16);
        assert_eq!(SQUARES.len(), 2);
        assert_eq!(SQUARES.stats(), Stats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_fn_cache_keeps_first_output() {
        let cache = FnCache::new();
        assert_eq!(memoized(&cache, "first", ("a", 1), |_| 'x'), 'x');
        assert_eq!(memoized(&cache, "first", ("a", 1), |_| 'y'), 'x');
        assert_eq!(memoized(&cache, "first", (1, "a"), |_| 'z'), 'z');
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_fn_cache_concurrent_first_calls() {
        let cache = FnCache::new();
        let runs = AtomicUsize::new(0);
        let barrier = Barrier::new(8);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    barrier.wait();
                    let output = memoized(&cache, "slow", (2, 3), |(a, b)| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        a + b
                    });
                    assert_eq!(output, 5);
                });
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), Stats { hits: 7, misses: 1 });
    }
}
