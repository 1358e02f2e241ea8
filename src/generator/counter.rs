use std::sync::atomic::{AtomicU64, Ordering};

use super::Generator;

/// Issues `start`, `start + 1`, `start + 2`, ... with no gaps and no repeats.
///
/// The counter is a single atomic, so it can be shared between threads;
/// every `next` is one `fetch_add`. Since all operations touch the same
/// location, `last` observes every id whose issuance happened before it.
pub struct CounterGenerator {
    start: u64,
    next_value: AtomicU64,
}

impl CounterGenerator {
    pub fn new(start: u64) -> Self {
        Self {
            start,
            next_value: AtomicU64::new(start),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of values issued so far.
    pub fn issued(&self) -> u64 {
        self.next_value.load(Ordering::Relaxed) - self.start
    }
}

impl Generator for CounterGenerator {
    fn next(&self) -> u64 {
        self.next_value.fetch_add(1, Ordering::Relaxed)
    }

    fn last(&self) -> Option<u64> {
        let next_value = self.next_value.load(Ordering::Relaxed);
        (next_value > self.start).then(|| next_value - 1)
    }

    fn describe(&self) -> String {
        format!("Counter(start={})", self.start)
    }
}
