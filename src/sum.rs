use crate::error::Result;
use crate::key::PairKey;
use crate::memo::{Config, Memo, Stats};

/// Addition, memoized by ordered argument pair.
///
/// ```
/// # use pairmemo::MemoizedSum;
/// let mut sum = MemoizedSum::new();
/// assert_eq!(sum.call(3.0, 4.0)?, 7.0); // [Miss] The cache is empty.
/// assert_eq!(sum.call(3.0, 4.0)?, 7.0); // [Hit]  Same pair.
/// assert_eq!(sum.call(4.0, 3.0)?, 7.0); // [Miss] The key is ordered.
/// assert_eq!(sum.computations(), 2);
/// # Ok::<(), pairmemo::Error>(())
/// ```
#[derive(Debug)]
pub struct MemoizedSum {
    memo: Memo<PairKey, f64, fn(&PairKey) -> f64>,
}

impl MemoizedSum {
    /// Create a wrapper with an empty cache.
    pub fn new() -> Self {
        let add: fn(&PairKey) -> f64 = add;
        Self { memo: Memo::with_config(add, Config::named("sum")) }
    }

    /// Add two numbers, reusing the result of an earlier call with the same
    /// arguments in the same order.
    ///
    /// Fails without touching the cache if either argument is not finite.
    pub fn call(&mut self, a: f64, b: f64) -> Result<f64> {
        let key = PairKey::new(a, b)?;
        Ok(self.call_key(key))
    }

    /// Like [`call`](Self::call), for a key that is already validated.
    pub fn call_key(&mut self, key: PairKey) -> f64 {
        self.memo.call(key)
    }

    /// The cached sum for the pair, if any.
    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.memo.get(key).copied()
    }

    /// Whether the pair `(a, b)` has a cached sum. Non-finite pairs never do.
    pub fn contains(&self, a: f64, b: f64) -> bool {
        PairKey::new(a, b).is_ok_and(|key| self.memo.contains(&key))
    }

    /// The number of cached pairs.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// The cached pairs, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.memo.keys()
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> Stats {
        self.memo.stats()
    }

    /// How often the addition actually ran.
    pub fn computations(&self) -> usize {
        self.memo.stats().misses
    }
}

impl Default for MemoizedSum {
    fn default() -> Self {
        Self::new()
    }
}

fn add(key: &PairKey) -> f64 {
    key.a() + key.b()
}
