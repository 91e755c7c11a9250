use std::collections::hash_map::Entry;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Settings for a memoizer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Identifies the memoizer in log output.
    pub name: &'static str,
    /// Whether results are cached at all. When disabled, every call executes
    /// the function and nothing is stored.
    pub enabled: bool,
}

impl Config {
    /// The default configuration under a different name.
    pub fn named(name: &'static str) -> Self {
        Self { name, ..Self::default() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { name: "memo", enabled: true }
    }
}

/// Hit and miss counters of a memoizer.
///
/// Every miss is exactly one execution of the memoized function.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Calls answered from the cache.
    pub hits: usize,
    /// Calls that executed the function.
    pub misses: usize,
}

impl Stats {
    /// The total number of calls.
    pub fn calls(&self) -> usize {
        self.hits + self.misses
    }
}

/// Caches the results of a function by its input.
///
/// The cache belongs to this instance: two memoizers built from the same
/// function share nothing. An entry, once written, is never updated or
/// removed.
pub struct Memo<K, V, F> {
    /// The memoized function.
    func: F,
    /// Maps from inputs to the outputs computed for them.
    map: FxHashMap<K, V>,
    stats: Stats,
    config: Config,
}

impl<K, V, F> Memo<K, V, F>
where
    K: Hash + Eq,
    F: FnMut(&K) -> V,
{
    /// Wrap a function with an empty cache.
    pub fn new(func: F) -> Self {
        Self::with_config(func, Config::default())
    }

    /// Wrap a function with an empty cache and custom settings.
    pub fn with_config(func: F, config: Config) -> Self {
        Self { func, map: FxHashMap::default(), stats: Stats::default(), config }
    }

    /// Execute the function or use the cached result for `key`.
    pub fn call(&mut self, key: K) -> V
    where
        K: Debug,
        V: Clone,
    {
        let name = self.config.name;

        // Early bypass if memoization is disabled.
        if !self.config.enabled {
            debug!(memo = name, ?key, "bypass");
            self.stats.misses += 1;

            #[cfg(feature = "testing")]
            crate::testing::register_miss();

            return (self.func)(&key);
        }

        match self.map.entry(key) {
            Entry::Occupied(entry) => {
                trace!(memo = name, key = ?entry.key(), "hit");
                self.stats.hits += 1;

                #[cfg(feature = "testing")]
                crate::testing::register_hit();

                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let value = (self.func)(entry.key());
                debug!(memo = name, key = ?entry.key(), "miss");
                self.stats.misses += 1;

                #[cfg(feature = "testing")]
                crate::testing::register_miss();

                entry.insert(value).clone()
            }
        }
    }
}

impl<K, V, F> Memo<K, V, F>
where
    K: Hash + Eq,
{
    /// The cached result for `key`, without executing anything.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Whether a result for `key` is cached.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// The number of cached results.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The cached inputs, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// The memoizer's settings.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<K, V, F> Debug for Memo<K, V, F> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Memo")
            .field("name", &self.config.name)
            .field("len", &self.map.len())
            .field("stats", &self.stats)
            .finish()
    }
}
