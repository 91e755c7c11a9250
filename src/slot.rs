use tracing::debug;

use crate::memo::Stats;

/// Remembers one value together with the dependencies it was computed from.
///
/// The value is recomputed only when the dependencies passed to
/// [`get_or_compute`](Self::get_or_compute) differ from the stored ones.
/// This covers both a derived value with a dependency list and a rendered
/// output that is reused while its props stay equal. With `D = ()` the value
/// is computed exactly once.
#[derive(Debug, Clone)]
pub struct Slot<D, V> {
    entry: Option<(D, V)>,
    stats: Stats,
}

impl<D: PartialEq, V> Slot<D, V> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self { entry: None, stats: Stats::default() }
    }

    /// Return the stored value if `deps` are unchanged, otherwise compute a
    /// new one and replace the entry.
    pub fn get_or_compute<F>(&mut self, deps: D, func: F) -> &V
    where
        F: FnOnce(&D) -> V,
    {
        let fresh = matches!(&self.entry, Some((stored, _)) if *stored == deps);
        if fresh {
            self.stats.hits += 1;
        } else {
            debug!(hits = self.stats.hits, misses = self.stats.misses, "slot recompute");
            self.stats.misses += 1;
            self.entry = None;
        }

        #[cfg(feature = "testing")]
        if fresh {
            crate::testing::register_hit();
        } else {
            crate::testing::register_miss();
        }

        let (_, value) = self.entry.get_or_insert_with(|| {
            let value = func(&deps);
            (deps, value)
        });
        value
    }

    /// The stored value, regardless of its dependencies.
    pub fn get(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, value)| value)
    }

    /// The dependencies of the stored value.
    pub fn deps(&self) -> Option<&D> {
        self.entry.as_ref().map(|(deps, _)| deps)
    }

    /// Forget the stored value. The next call computes again.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }
}

impl<D: PartialEq, V> Default for Slot<D, V> {
    fn default() -> Self {
        Self::new()
    }
}
