use anyhow::Result;

use super::{fnv_hash64, Generator, LastValue, ZipfianGenerator};

// Smallest number of popularity ranks drawn before hashing.
const MIN_RANK_SPACE: u64 = 10_000_000_000;
// Ranks per value of the range once the range outgrows `MIN_RANK_SPACE`.
const RANKS_PER_ITEM: u64 = 16;

/// A Zipfian generator whose popular items are scattered across the range.
///
/// A popularity rank is drawn from a Zipfian law over a rank space much
/// larger than the range and then hashed into `[lower, upper]`, so the hot
/// items are not clustered at the beginning of the key space. The rank space
/// has at least `RANKS_PER_ITEM` ranks per value, which leaves only a
/// negligible share of the range without a rank hashing into it. Ranges
/// beyond `u64::MAX / RANKS_PER_ITEM` values get fewer ranks per value.
pub struct ScrambledZipfianGenerator {
    ranks: ZipfianGenerator,
    lower: u64,
    items: u64,
    last: LastValue,
}

impl ScrambledZipfianGenerator {
    pub fn new(lower: u64, upper: u64, skewness: f64, seed: u64) -> Result<Self> {
        anyhow::ensure!(
            lower <= upper,
            "Upper bound ({}) for scrambled zipfian generator is smaller than the lower bound ({}).",
            upper,
            lower
        );
        let items = upper - lower + 1;
        let rank_space = MIN_RANK_SPACE.max(items.saturating_mul(RANKS_PER_ITEM));
        let ranks = ZipfianGenerator::new(0, rank_space - 1, skewness, seed)?;

        Ok(Self {
            ranks,
            lower,
            items,
            last: LastValue::new(),
        })
    }
}

impl Generator for ScrambledZipfianGenerator {
    fn next(&self) -> u64 {
        let rank = self.ranks.next_rank();
        let value = self.lower + fnv_hash64(rank) % self.items;
        self.last.set(value)
    }

    fn last(&self) -> Option<u64> {
        self.last.get()
    }

    fn describe(&self) -> String {
        format!(
            "ScrambledZipfian(min={}, max={}, ranks={})",
            self.lower,
            self.lower + (self.items - 1),
            self.ranks.items()
        )
    }
}
