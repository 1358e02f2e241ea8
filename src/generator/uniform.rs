use anyhow::Result;
use rand_distr::Distribution;

use super::{Generator, LastValue, ThreadLocalRng};

/// Samples integers uniformly from `[lower, upper]`.
pub struct UniformGenerator {
    sampler: rand_distr::Uniform<u64>,
    lower: u64,
    upper: u64,
    rng: ThreadLocalRng,
    last: LastValue,
}

impl UniformGenerator {
    pub fn new(lower: u64, upper: u64, seed: u64) -> Result<Self> {
        anyhow::ensure!(
            lower <= upper,
            "Upper bound ({}) for uniform generator is smaller than the lower bound ({}).",
            upper,
            lower
        );

        Ok(Self {
            sampler: rand_distr::Uniform::new_inclusive(lower, upper),
            lower,
            upper,
            rng: ThreadLocalRng::new(seed),
            last: LastValue::new(),
        })
    }
}

impl Generator for UniformGenerator {
    fn next(&self) -> u64 {
        let value = self.sampler.sample(&mut *self.rng.get());
        self.last.set(value)
    }

    fn last(&self) -> Option<u64> {
        self.last.get()
    }

    fn describe(&self) -> String {
        format!("Uniform(min={}, max={})", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_uniform_covers_range() {
        let uniform = UniformGenerator::new(3, 7, 1).unwrap();
        assert_eq!(uniform.last(), None);

        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let value = uniform.next();
            assert!((3..=7).contains(&value));
            assert_eq!(uniform.last(), Some(value));
            seen.insert(value);
        }
        assert_eq!(seen, (3..=7).collect::<HashSet<_>>());
    }

    #[test]
    fn test_uniform_single_value() {
        let uniform = UniformGenerator::new(5, 5, 1).unwrap();
        assert!((0..10).all(|_| uniform.next() == 5));
    }

    #[test]
    fn test_uniform_invalid_range() {
        assert!(UniformGenerator::new(5, 4, 1).is_err());
        assert_eq!(
            UniformGenerator::new(4, 5, 1).unwrap().describe(),
            "Uniform(min=4, max=5)"
        );
    }

    #[test]
    fn test_uniform_same_seed_same_stream() {
        let a = UniformGenerator::new(0, 1_000_000, 99).unwrap();
        let b = UniformGenerator::new(0, 1_000_000, 99).unwrap();
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }
}
