use std::sync::Arc;

use anyhow::Result;

use super::{CounterGenerator, Generator, LastValue, ZipfianGenerator};

/// Favours the most recently issued ids of a counter.
///
/// The distance from the counter's latest id is Zipfian distributed, so the
/// newest id is the most popular one, the one before it is the second most
/// popular, and so on. Distances reaching below the counter's start are
/// redrawn, which keeps the law exactly Zipfian over the issued ids.
pub struct SkewedLatestGenerator {
    basis: Arc<CounterGenerator>,
    distances: ZipfianGenerator,
    last: LastValue,
}

impl SkewedLatestGenerator {
    /// `max_items` bounds the number of ids the basis is expected to issue.
    pub fn new(
        basis: Arc<CounterGenerator>,
        max_items: u64,
        skewness: f64,
        seed: u64,
    ) -> Result<Self> {
        anyhow::ensure!(
            max_items > 0,
            "Latest generator needs at least one item"
        );
        let distances = ZipfianGenerator::new(0, max_items - 1, skewness, seed)?;

        Ok(Self {
            basis,
            distances,
            last: LastValue::new(),
        })
    }
}

impl Generator for SkewedLatestGenerator {
    /// Returns the start of the basis while the basis has not issued anything.
    fn next(&self) -> u64 {
        let Some(latest) = self.basis.last() else {
            return self.last.set(self.basis.start());
        };
        let span = latest - self.basis.start();

        let distance = loop {
            let distance = self.distances.next_rank();
            if distance <= span {
                break distance;
            }
        };
        self.last.set(latest - distance)
    }

    fn last(&self) -> Option<u64> {
        self.last.get()
    }

    fn describe(&self) -> String {
        format!(
            "SkewedLatest(start={}, max_items={})",
            self.basis.start(),
            self.distances.items()
        )
    }
}
