use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use strum::IntoEnumIterator;
use thread_local::ThreadLocal;

use crate::workload::Operation;

pub trait Stats: Default + Send {
    fn clear(&mut self);
    fn combine(&mut self, other: &Self);
}

/// Statistics split into one shard per thread.
///
/// A thread only ever touches its own shard while generating requests.
/// Reporting merges all shards into a fresh object and resets them.
/// Shards are guarded by separate parking_lot mutexes, which stay
/// uncontended as long as reports are rare.
pub struct ShardedStats<S: Stats> {
    shards: ThreadLocal<Arc<Mutex<S>>>,
    all: Mutex<Vec<Arc<Mutex<S>>>>,
}

impl<S: Stats> Default for ShardedStats<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stats> ShardedStats<S> {
    pub fn new() -> Self {
        Self {
            shards: ThreadLocal::new(),
            all: Mutex::new(Vec::new()),
        }
    }

    /// Gets and locks access to this thread's stats structure.
    pub fn get_shard_mut(&self) -> MutexGuard<'_, S> {
        self.shards
            .get_or(|| {
                let shard = Arc::new(Mutex::new(S::default()));
                self.all.lock().push(shard.clone());
                shard
            })
            .lock()
    }

    /// Combines statistics from all threads and clears all threads' stats.
    pub fn get_combined_and_clear(&self) -> S {
        let mut combined = S::default();
        for shard in self.all.lock().iter() {
            let shard = &mut shard.lock();
            combined.combine(shard);
            shard.clear();
        }
        combined
    }
}

/// Number of requests generated per operation type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationStats {
    counts: [u64; 5],
}

impl OperationStats {
    pub fn account(&mut self, op: Operation) {
        self.counts[Self::slot(op)] += 1;
    }

    pub fn count(&self, op: Operation) -> u64 {
        self.counts[Self::slot(op)]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn slot(op: Operation) -> usize {
        match op {
            Operation::Insert => 0,
            Operation::Read => 1,
            Operation::Update => 2,
            Operation::Scan => 3,
            Operation::ReadModifyWrite => 4,
        }
    }

    pub fn print_summary(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        writeln!(out, "******************** Operation Summary ********************")?;
        for op in Operation::iter() {
            let count = self.count(op);
            let share = if self.total() > 0 {
                100.0 * count as f64 / self.total() as f64
            } else {
                0.0
            };
            writeln!(out, "{:<16} {:>12} {:>7.2}%", op.as_ref(), count, share)?;
        }
        writeln!(out, "{:<16} {:>12}", "TOTAL", self.total())
    }
}

impl Stats for OperationStats {
    fn clear(&mut self) {
        self.counts = [0; 5];
    }

    fn combine(&mut self, other: &Self) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_across_threads() {
        let stats = ShardedStats::<OperationStats>::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.get_shard_mut().account(Operation::Read);
                    }
                    stats.get_shard_mut().account(Operation::Scan);
                });
            }
        });
        stats.get_shard_mut().account(Operation::Insert);

        let combined = stats.get_combined_and_clear();
        assert_eq!(combined.count(Operation::Read), 400);
        assert_eq!(combined.count(Operation::Scan), 4);
        assert_eq!(combined.count(Operation::Insert), 1);
        assert_eq!(combined.count(Operation::Update), 0);
        assert_eq!(combined.total(), 405);

        assert_eq!(stats.get_combined_and_clear(), OperationStats::default());
    }

    #[test]
    fn test_summary() {
        let mut stats = OperationStats::default();
        stats.account(Operation::Read);
        stats.account(Operation::Read);
        stats.account(Operation::ReadModifyWrite);
        stats.account(Operation::Update);

        let mut out = Vec::new();
        stats.print_summary(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("READ                        2   50.00%"), "{}", out);
        assert!(out.contains("READMODIFYWRITE             1   25.00%"), "{}", out);
        assert!(out.contains("TOTAL                       4"), "{}", out);
    }
}
