use std::time::Instant;

use anyhow::{Context, Result};

use crate::db::Db;
use crate::sharded_stats::{OperationStats, ShardedStats};
use crate::workload::{CoreWorkload, Operation};

/// Runs the load phase: issues `count` sequence keys and inserts them.
///
/// Without a db the keys are still issued, so that the transaction phase
/// sees the same high-water mark as a run which wrote the dataset.
pub fn load(workload: &CoreWorkload, mut db: Option<&mut dyn Db>, count: u64) -> Result<()> {
    let start = Instant::now();
    tracing::info!(
        records = count,
        key_space = %workload.key_space().describe(),
        write = db.is_some(),
        "load phase started"
    );

    for _ in 0..count {
        let key = workload.next_sequence_key(false);
        if let Some(db) = db.as_deref_mut() {
            db.insert(&key)
                .with_context(|| format!("Failed to insert {}", key))?;
        }
    }
    if let Some(db) = db {
        db.flush().context("Failed to flush the dataset")?;
    }

    tracing::info!(
        elapsed = ?start.elapsed(),
        high_water_mark = ?workload.high_water_mark(),
        "load phase finished"
    );
    Ok(())
}

/// Runs the transaction phase: `count` operations drawn from the mix.
pub fn transact(
    workload: &CoreWorkload,
    db: &mut dyn Db,
    count: u64,
    stats: &ShardedStats<OperationStats>,
) -> Result<()> {
    let start = Instant::now();
    tracing::info!(operations = count, "transaction phase started");

    for _ in 0..count {
        let op = workload.next_operation();
        do_transaction(workload, db, op).with_context(|| format!("Failed to perform {}", op))?;
        stats.get_shard_mut().account(op);
    }
    db.flush().context("Failed to flush the queries")?;

    tracing::debug!(
        inserts = workload.transaction_inserts(),
        rejected_candidates = workload.rejected_candidates(),
        "transaction phase counters"
    );
    tracing::info!(elapsed = ?start.elapsed(), "transaction phase finished");
    Ok(())
}

fn do_transaction(workload: &CoreWorkload, db: &mut dyn Db, op: Operation) -> Result<()> {
    match op {
        Operation::Read => db.read(&workload.next_transaction_key()),
        Operation::Update => db.update(&workload.next_transaction_key()),
        Operation::Insert => db.insert(&workload.next_sequence_key(true)),
        Operation::Scan => {
            let key = workload.next_transaction_key();
            let len = workload.next_scan_length();
            db.scan(&key, len)
        }
        Operation::ReadModifyWrite => db.read_modify_write(&workload.next_transaction_key()),
    }
}
