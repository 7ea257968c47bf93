//! skein-cli — Command-line driver for multi-input address clustering.
//!
//! Wires the ledger loading layer to the clustering engine: load the
//! dataset, join inputs to the outputs they spend, union each
//! transaction's input addresses, then print statistics and optionally
//! export the cluster table.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use skein_cluster::{ClusterEngine, ClusterStats};

/// Skein address clustering toolkit.
#[derive(Parser)]
#[command(name = "skein-cli")]
#[command(version, about = "Untangle co-spending addresses.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a ledger snapshot and report cluster statistics.
    Cluster(ClusterArgs),
    /// Re-derive statistics from an exported cluster table.
    Stats(StatsArgs),
}

#[derive(Args)]
struct ClusterArgs {
    /// Path to inputs.csv (txId,prevTxId,prevTxpos).
    #[arg(short, long)]
    inputs: PathBuf,

    /// Path to outputs.csv (txId,position,addressId,amount,scripttype).
    #[arg(short, long)]
    outputs: PathBuf,

    /// Path to the address mapping file (hash,addressId). When given,
    /// clustering runs over this closed address universe and unknown
    /// ids are a hard error; without it, ids register on first sight.
    #[arg(short, long)]
    addresses: Option<PathBuf>,

    /// Path to transactions.csv, loaded only for a dataset summary.
    #[arg(short, long)]
    transactions: Option<PathBuf>,

    /// Export the cluster table as JSON to this path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// List the N largest clusters after the run.
    #[arg(long, default_value = "0")]
    top: usize,
}

#[derive(Args)]
struct StatsArgs {
    /// Path to an exported cluster table (clusters.json).
    #[arg(short, long)]
    clusters: PathBuf,

    /// List the N largest clusters.
    #[arg(long, default_value = "10")]
    top: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster(args) => run_cluster(args),
        Commands::Stats(args) => run_stats(args),
    }
}

/// Load, join, cluster, report, export.
fn run_cluster(args: ClusterArgs) -> Result<()> {
    let started = Instant::now();

    if let Some(path) = &args.transactions {
        let records = skein_ledger::load_transactions(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let coinbase = records.iter().filter(|r| r.coinbase).count();
        info!(
            transactions = records.len(),
            coinbase,
            "dataset summary"
        );
    }

    let index = skein_ledger::load_outputs(&args.outputs)
        .with_context(|| format!("failed to load {}", args.outputs.display()))?;
    let pairs = skein_ledger::load_spender_pairs(&args.inputs, &index)
        .with_context(|| format!("failed to load {}", args.inputs.display()))?;
    info!(elapsed = ?started.elapsed(), "ledger loaded and joined");

    let mut engine = match &args.addresses {
        Some(path) => {
            let universe = skein_ledger::load_address_universe(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            ClusterEngine::with_universe(universe)
        }
        None => ClusterEngine::new(),
    };

    let union_started = Instant::now();
    engine
        .ingest_pairs(pairs)
        .context("clustering halted on malformed ledger data")?;
    let merges = engine.merge_count();
    let map = engine.finalize().context("finalize failed")?;
    info!(elapsed = ?union_started.elapsed(), "clustering complete");

    let stats = ClusterStats::from_map(map);
    println!("\n=== CLUSTERING RESULT ===");
    println!("Addresses:        {}", map.address_count());
    println!("Clusters:         {}", stats.count);
    println!("Effective merges: {merges}");
    println!("Mean cluster size: {:.4}", stats.mean_size);
    println!("Min cluster size:  {}", stats.min_size);
    println!("Max cluster size:  {}", stats.max_size);

    if args.top > 0 {
        print_top(map.sizes_descending(), args.top);
    }

    if let Some(out) = &args.out {
        skein_ledger::write_clusters(out, map)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("\nCluster table written to: {}", out.display());
    }

    info!(elapsed = ?started.elapsed(), "done");
    Ok(())
}

/// Reload an exported table and re-derive its statistics.
fn run_stats(args: StatsArgs) -> Result<()> {
    let map = skein_ledger::read_clusters(&args.clusters)
        .with_context(|| format!("failed to read {}", args.clusters.display()))?;
    let stats = ClusterStats::from_map(&map);

    println!("\n=== CLUSTER TABLE ===");
    println!("Addresses:         {}", map.address_count());
    println!("Clusters:          {}", stats.count);
    println!("Mean cluster size: {:.4}", stats.mean_size);
    println!("Min cluster size:  {}", stats.min_size);
    println!("Max cluster size:  {}", stats.max_size);

    if args.top > 0 {
        print_top(map.sizes_descending(), args.top);
    }
    Ok(())
}

fn print_top(sizes: Vec<(skein_core::types::AddressId, usize)>, top: usize) {
    println!("\nLargest clusters:");
    for (root, size) in sizes.into_iter().take(top) {
        println!("  root {root}: {size} addresses");
    }
}
