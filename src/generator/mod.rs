use std::cell::{Cell, RefCell, RefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use thread_local::ThreadLocal;

pub mod counter;
pub mod discrete;
pub mod scrambled_zipfian;
pub mod skewed_latest;
pub mod uniform;
pub mod zipfian;

pub use counter::CounterGenerator;
pub use discrete::DiscreteGenerator;
pub use scrambled_zipfian::ScrambledZipfianGenerator;
pub use skewed_latest::SkewedLatestGenerator;
pub use uniform::UniformGenerator;
pub use zipfian::{ZipfianGenerator, ZIPFIAN_CONSTANT};

pub type RngGen = Pcg64Mcg;

/// A generator of 64-bit unsigned values.
///
/// Generators are shared between threads, so both methods take `&self`.
/// Implementations which need randomness keep a private random state per
/// calling thread, therefore `last` reports the value most recently returned
/// to the calling thread.
pub trait Generator: Send + Sync {
    /// Advances the generator and returns the next value.
    fn next(&self) -> u64;

    /// Returns the value most recently returned by `next`, without advancing.
    /// `None` if `next` was never called.
    fn last(&self) -> Option<u64>;

    /// Names the law and its parameters, for logs.
    fn describe(&self) -> String;
}

/// Per-thread random state used by the random generators.
///
/// Each thread gets its own `Pcg64Mcg`. The first thread to touch the
/// generator is seeded with the base seed itself, the following ones with
/// seeds derived from it, so a single-threaded run is fully reproducible.
pub(crate) struct ThreadLocalRng {
    seed: u64,
    streams: AtomicU64,
    rng: ThreadLocal<RefCell<RngGen>>,
}

const STREAM_SEED_INCREMENT: u64 = 0x9E37_79B9_7F4A_7C15;

impl ThreadLocalRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: AtomicU64::new(0),
            rng: ThreadLocal::new(),
        }
    }

    pub(crate) fn get(&self) -> RefMut<'_, RngGen> {
        self.rng
            .get_or(|| {
                let stream = self.streams.fetch_add(1, Ordering::Relaxed);
                let seed = self
                    .seed
                    .wrapping_add(stream.wrapping_mul(STREAM_SEED_INCREMENT));
                RefCell::new(RngGen::seed_from_u64(seed))
            })
            .borrow_mut()
    }
}

/// Remembers the last value returned to each thread.
#[derive(Default)]
pub(crate) struct LastValue {
    value: ThreadLocal<Cell<Option<u64>>>,
}

impl LastValue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self) -> Option<u64> {
        self.value.get().and_then(Cell::get)
    }

    pub(crate) fn set(&self, value: u64) -> u64 {
        self.value.get_or_default().set(Some(value));
        value
    }
}

const FNV_OFFSET_BASIS_64: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME_64: u64 = 1_099_511_628_211;

/// 64-bit FNV-1a hash over the little-endian octets of `value`.
pub fn fnv_hash64(value: u64) -> u64 {
    value.to_le_bytes().iter().fold(FNV_OFFSET_BASIS_64, |hash, octet| {
        (hash ^ u64::from(*octet)).wrapping_mul(FNV_PRIME_64)
    })
}
