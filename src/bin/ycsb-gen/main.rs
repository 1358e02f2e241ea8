mod args;

#[cfg(test)]
mod args_test;

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ycsb_gen::config::WorkloadConfig;
use ycsb_gen::db::TraceDb;
use ycsb_gen::run;
use ycsb_gen::sharded_stats::{OperationStats, ShardedStats};
use ycsb_gen::workload::CoreWorkload;

use crate::args::{ParseResult, YcsbGenArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match args::parse_ycsb_gen_args(env::args(), true) {
        Some(ParseResult::Config(args)) => args,
        Some(ParseResult::HelpDisplayed) | Some(ParseResult::VersionDisplayed) => return Ok(()),
        None => return Err(anyhow::anyhow!("Failed to parse CLI arguments.")),
    };

    let props = args.load_properties()?;
    let config = WorkloadConfig::from_properties(&props).context("Invalid workload properties")?;
    config.print_settings();

    generate(&args, config).context("Failed to generate the workload")
}

fn generate(args: &YcsbGenArgs, config: WorkloadConfig) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;

    let record_count = config.record_count;
    let operation_count = config.operation_count;
    let workload = CoreWorkload::new(config)?;

    if args.query_only {
        run::load(&workload, None, record_count)?;
    } else {
        let mut dataset = TraceDb::create(&args.dataset_output())?;
        run::load(&workload, Some(&mut dataset), record_count)?;
    }

    let stats = ShardedStats::<OperationStats>::new();
    let mut queries = TraceDb::create(&args.query_output())?;
    run::transact(&workload, &mut queries, operation_count, &stats)?;

    stats
        .get_combined_and_clear()
        .print_summary(&mut std::io::stdout())?;
    Ok(())
}
