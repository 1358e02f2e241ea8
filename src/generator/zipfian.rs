use anyhow::{Context, Result};
use rand_distr::{Distribution, Zipf};

use super::{Generator, LastValue, ThreadLocalRng};

/// Default skewness of the Zipfian generators.
pub const ZIPFIAN_CONSTANT: f64 = 0.99;

/// Samples integers from `[lower, upper]` following a Zipfian law.
///
/// `lower` is the most popular value, `lower + 1` the second most popular
/// and so on: the probability of the item of rank `k` is proportional
/// to `1 / k^skewness`.
pub struct ZipfianGenerator {
    dist: Zipf<f64>,
    lower: u64,
    items: u64,
    skewness: f64,
    rng: ThreadLocalRng,
    last: LastValue,
}

impl ZipfianGenerator {
    pub fn new(lower: u64, upper: u64, skewness: f64, seed: u64) -> Result<Self> {
        anyhow::ensure!(
            lower <= upper,
            "Upper bound ({}) for zipfian generator is smaller than the lower bound ({}).",
            upper,
            lower
        );
        anyhow::ensure!(
            skewness.is_finite() && skewness >= 0.0,
            "Zipfian skewness must be a non-negative number, got {}",
            skewness
        );

        let items = upper - lower + 1;
        let dist = Zipf::new(items, skewness)
            .with_context(|| format!("Invalid zipfian parameters: {items} items"))?;

        Ok(Self {
            dist,
            lower,
            items,
            skewness,
            rng: ThreadLocalRng::new(seed),
            last: LastValue::new(),
        })
    }

    pub fn items(&self) -> u64 {
        self.items
    }

    /// Draws a zero-based popularity rank in `[0, items)`.
    pub(crate) fn next_rank(&self) -> u64 {
        let rank = self.dist.sample(&mut *self.rng.get()) as u64;
        // Zipf samples ranks starting from 1
        rank.clamp(1, self.items) - 1
    }
}

impl Generator for ZipfianGenerator {
    fn next(&self) -> u64 {
        let value = self.lower + self.next_rank();
        self.last.set(value)
    }

    fn last(&self) -> Option<u64> {
        self.last.get()
    }

    fn describe(&self) -> String {
        format!(
            "Zipfian(min={}, max={}, skewness={})",
            self.lower,
            self.lower + (self.items - 1),
            self.skewness
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zipfian_bounds() {
        let zipf = ZipfianGenerator::new(1, 100, ZIPFIAN_CONSTANT, 3).unwrap();
        for _ in 0..100_000 {
            let value = zipf.next();
            assert!((1..=100).contains(&value), "out of range: {}", value);
        }
    }

    #[test]
    fn test_zipfian_favours_low_values() {
        let zipf = ZipfianGenerator::new(10, 1009, ZIPFIAN_CONSTANT, 5).unwrap();
        let mut counts = vec![0u64; 1000];
        for _ in 0..100_000 {
            counts[(zipf.next() - 10) as usize] += 1;
        }

        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
        // The first ten items take a large share of the mass
        let head: u64 = counts[..10].iter().sum();
        assert!(head > 30_000, "head share too small: {}", head);

        // p(1) / p(2) = 2^0.99
        let ratio = counts[0] as f64 / counts[1] as f64;
        assert!(ratio > 1.8 && ratio < 2.2, "ratio: {}", ratio);
    }

    #[test]
    fn test_zipfian_zero_skewness_is_uniform() {
        let zipf = ZipfianGenerator::new(0, 3, 0.0, 11).unwrap();
        let mut counts = [0u64; 4];
        for _ in 0..40_000 {
            counts[zipf.next() as usize] += 1;
        }
        for count in counts {
            assert!((9_000..11_000).contains(&count), "counts: {:?}", counts);
        }
    }

    #[test]
    fn test_zipfian_invalid_parameters() {
        assert!(ZipfianGenerator::new(2, 1, ZIPFIAN_CONSTANT, 0).is_err());
        assert!(ZipfianGenerator::new(0, 10, -1.0, 0).is_err());
        assert!(ZipfianGenerator::new(0, 10, f64::NAN, 0).is_err());
        assert_eq!(
            ZipfianGenerator::new(1, 10, 0.5, 0).unwrap().describe(),
            "Zipfian(min=1, max=10, skewness=0.5)"
        );
    }
}
