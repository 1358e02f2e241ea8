use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::{RequestDistribution, ScanLengthDistribution, WorkloadConfig};
use crate::generator::{
    CounterGenerator, DiscreteGenerator, Generator, ScrambledZipfianGenerator,
    SkewedLatestGenerator, UniformGenerator, ZipfianGenerator, ZIPFIAN_CONSTANT,
};
use crate::key::{Key, KeySpace};

/// Operations issued during the transaction phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum Operation {
    Insert,
    Read,
    Update,
    Scan,
    #[strum(serialize = "READMODIFYWRITE")]
    ReadModifyWrite,
}

impl Operation {
    /// Decodes an operation name, failing for anything outside the five
    /// known operations.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|_| anyhow::anyhow!("Operation request is not recognized: {:?}", s))
    }
}

// After this many rejected candidates in a row a warning is logged.
const REJECTION_WARNING_INTERVAL: u64 = 1_000_000;

/// Generates the keys of the load phase and the operations and keys
/// of the transaction phase.
///
/// All methods take `&self`, so a single workload can be shared by many
/// threads. The only state shared between the callers is the load counter,
/// whose last issued id is the high-water mark of the key space. Random
/// choices are made with per-thread random state.
pub struct CoreWorkload {
    config: WorkloadConfig,
    key_space: KeySpace,

    // Issues the ids of loaded and inserted records. Its last id is
    // the high-water mark of the key space.
    key_sequence: Arc<CounterGenerator>,
    // Names the records inserted by transactions, disjoint from load ids.
    insert_key_sequence: CounterGenerator,

    key_chooser: Box<dyn Generator>,
    op_chooser: DiscreteGenerator<Operation>,
    scan_len_chooser: Box<dyn Generator>,

    rejections: AtomicU64,
}

impl CoreWorkload {
    /// Builds the workload. The keyset file, if configured, is read here.
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;

        let key_space = match &config.dataset_file {
            Some(path) => KeySpace::open(
                path,
                config.keyset_capacity(),
                config.insert_order,
                config.key_width,
            )?,
            None => KeySpace::synthetic(config.insert_order, config.key_width),
        };

        Self::with_key_space(config, key_space)
    }

    /// Builds the workload on top of an already prepared key space.
    pub fn with_key_space(config: WorkloadConfig, key_space: KeySpace) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        // Each chooser gets its own stream
        let key_seed = seed;
        let op_seed = seed.wrapping_add(1);
        let scan_seed = seed.wrapping_add(2);

        let key_sequence = Arc::new(CounterGenerator::new(config.insert_start));
        let insert_key_sequence =
            CounterGenerator::new(config.insert_start + config.record_count);

        let key_chooser = Self::build_key_chooser(&config, &key_sequence, key_seed)
            .context("Failed to build the request key chooser")?;
        let op_chooser = Self::build_op_chooser(&config, op_seed)
            .context("Failed to build the operation chooser")?;
        let scan_len_chooser = Self::build_scan_len_chooser(&config, scan_seed)
            .context("Failed to build the scan length chooser")?;

        tracing::info!(
            key_space = %key_space.describe(),
            key_chooser = %key_chooser.describe(),
            scan_length_chooser = %scan_len_chooser.describe(),
            operations = %op_chooser,
            request_distribution = config.request_distribution.as_ref(),
            key_space_size = config.key_space_size(),
            seed,
            "workload initialized"
        );

        Ok(Self {
            config,
            key_space,
            key_sequence,
            insert_key_sequence,
            key_chooser,
            op_chooser,
            scan_len_chooser,
            rejections: AtomicU64::new(0),
        })
    }

    // The chooser ranges over the whole key space expected at the end
    // of the run, so that popular keys stay popular while records are
    // inserted. Candidates which were not loaded yet are rejected
    // by `next_transaction_key`.
    fn build_key_chooser(
        config: &WorkloadConfig,
        key_sequence: &Arc<CounterGenerator>,
        seed: u64,
    ) -> Result<Box<dyn Generator>> {
        let lower = config.insert_start;
        let upper = lower + (config.key_space_size() - 1);
        let skewness = config.zipfian_skewness;

        Ok(match config.request_distribution {
            RequestDistribution::Uniform => Box::new(UniformGenerator::new(lower, upper, seed)?),
            RequestDistribution::Zipfian => {
                Box::new(ScrambledZipfianGenerator::new(lower, upper, skewness, seed)?)
            }
            RequestDistribution::Latest => Box::new(SkewedLatestGenerator::new(
                Arc::clone(key_sequence),
                config.key_space_size(),
                skewness,
                seed,
            )?),
        })
    }

    fn build_op_chooser(config: &WorkloadConfig, seed: u64) -> Result<DiscreteGenerator<Operation>> {
        let p = &config.proportions;
        let weights = [
            (Operation::Read, p.read),
            (Operation::Update, p.update),
            (Operation::Insert, p.insert),
            (Operation::Scan, p.scan),
            (Operation::ReadModifyWrite, p.read_modify_write),
        ]
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

        DiscreteGenerator::new(weights, seed)
    }

    fn build_scan_len_chooser(config: &WorkloadConfig, seed: u64) -> Result<Box<dyn Generator>> {
        let max = config.max_scan_length as u64;
        Ok(match config.scan_length_distribution {
            ScanLengthDistribution::Uniform => Box::new(UniformGenerator::new(1, max, seed)?),
            ScanLengthDistribution::Zipfian => {
                Box::new(ZipfianGenerator::new(1, max, ZIPFIAN_CONSTANT, seed)?)
            }
        })
    }

    /// Issues the next sequence id and returns its key.
    ///
    /// The load phase calls it with `query == false`. Inserts issued
    /// by the transaction phase call it with `query == true`, which also
    /// advances the sequence naming transaction inserts.
    pub fn next_sequence_key(&self, query: bool) -> Key {
        let id = self.key_sequence.next();
        if query {
            self.insert_key_sequence.next();
        }
        self.key_space.encode(id)
    }

    /// Draws the key of a transaction-phase request.
    ///
    /// Candidates above the high-water mark refer to records which were
    /// not loaded yet, so they are redrawn. There is no bound on the number
    /// of redraws: at least one record must have been loaded, otherwise
    /// this never returns.
    pub fn next_transaction_key(&self) -> Key {
        let mut rejected = 0u64;
        let id = loop {
            let candidate = self.key_chooser.next();
            if self
                .key_sequence
                .last()
                .is_some_and(|high_water_mark| candidate <= high_water_mark)
            {
                break candidate;
            }

            rejected += 1;
            if rejected % REJECTION_WARNING_INTERVAL == 0 {
                tracing::warn!(
                    rejected,
                    high_water_mark = ?self.key_sequence.last(),
                    "request key chooser keeps drawing keys which were not loaded"
                );
            }
        };

        if rejected > 0 {
            self.rejections.fetch_add(rejected, Ordering::Relaxed);
        }
        self.key_space.encode(id)
    }

    pub fn next_operation(&self) -> Operation {
        self.op_chooser.next()
    }

    /// Returns a scan length in `[1, max_scan_length]`.
    pub fn next_scan_length(&self) -> usize {
        self.scan_len_chooser.next() as usize
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    pub fn key_space(&self) -> &KeySpace {
        &self.key_space
    }

    /// The last issued sequence id, `None` before the first one.
    pub fn high_water_mark(&self) -> Option<u64> {
        self.key_sequence.last()
    }

    /// Number of records inserted by the transaction phase so far.
    pub fn transaction_inserts(&self) -> u64 {
        self.insert_key_sequence.issued()
    }

    /// The id which named the most recent transaction-phase insert.
    pub fn last_transaction_insert(&self) -> Option<u64> {
        self.insert_key_sequence.last()
    }

    /// Total number of transaction key candidates rejected so far.
    pub fn rejected_candidates(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }
}
