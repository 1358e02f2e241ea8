use std::cell::Cell;

use anyhow::{Context, Result};
use rand_distr::{Distribution, WeightedIndex};
use thread_local::ThreadLocal;

use super::ThreadLocalRng;

/// Picks one of a fixed set of labeled outcomes according to their weights.
///
/// Weights need not be normalized, but must be non-negative and sum up
/// to a positive number. A draw is uniform over `[0, total)` and selects
/// the first outcome whose cumulative weight interval contains it,
/// in registration order.
pub struct DiscreteGenerator<T> {
    items: Vec<(T, f64)>,
    dist: WeightedIndex<f64>,
    rng: ThreadLocalRng,
    last: ThreadLocal<Cell<Option<usize>>>,
}

impl<T: Copy + Send + Sync> DiscreteGenerator<T> {
    pub fn new(items: Vec<(T, f64)>, seed: u64) -> Result<Self> {
        let dist = WeightedIndex::new(items.iter().map(|w| w.1))
            .context("Invalid weights for discrete generator")?;

        Ok(Self {
            items,
            dist,
            rng: ThreadLocalRng::new(seed),
            last: ThreadLocal::new(),
        })
    }

    pub fn next(&self) -> T {
        let idx = self.dist.sample(&mut *self.rng.get());
        self.last.get_or_default().set(Some(idx));
        self.items[idx].0
    }

    /// The outcome most recently returned to the calling thread.
    pub fn last(&self) -> Option<T> {
        let idx = self.last.get().and_then(Cell::get)?;
        Some(self.items[idx].0)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for DiscreteGenerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let items_str = self
            .items
            .iter()
            .map(|item| format!("{key}={value}", key = item.0, value = item.1))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{items_str}}}")
    }
}
