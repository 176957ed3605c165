//! One-off download metrics aggregation against the snapshot.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use packhub::metrics::{aggregate_downloads, TRAILING_DAYS};
use packhub::store::MemoryStore;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Metrics subcommands.
#[derive(Debug, Subcommand)]
pub enum MetricsAction {
    /// Recompute pack download stats and write the snapshot back
    Run {
        /// Snapshot file (defaults to store.snapshot)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Day to treat as "today" (YYYY-MM-DD, default: current UTC date)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Run a metrics subcommand.
pub fn run(action: MetricsAction) -> Result<(), CliError> {
    match action {
        MetricsAction::Run { snapshot, date } => run_aggregate(snapshot, date),
    }
}

fn run_aggregate(snapshot: Option<PathBuf>, date: Option<NaiveDate>) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("metrics run");

    let path = snapshot
        .or_else(|| runner.config().store.snapshot.clone())
        .ok_or_else(|| {
            CliError::Config(
                "No snapshot configured. Set store.snapshot or pass --snapshot.".to_string(),
            )
        })?;
    let today = date.unwrap_or_else(|| Utc::now().date_naive());

    let store = MemoryStore::load_snapshot(&path)?;
    let report = runner
        .runtime()?
        .block_on(aggregate_downloads(&store, today))?;
    store.save_snapshot(&path)?;

    println!("Aggregated downloads for {} ({}-day window)", today, TRAILING_DAYS);
    println!("  Counters:  {}", report.counters);
    println!("  Updated:   {}", report.updated);
    println!("  Unchanged: {}", report.unchanged);
    println!("  Skipped:   {}", report.skipped);
    Ok(())
}
