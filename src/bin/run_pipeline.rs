//! Run every stage in order: prepare, split, train, evaluate, figures
//!
//! Usage: cargo run --release --bin run_pipeline -- --config pipeline.toml

use anyhow::{Context, Result};
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the full catalog pipeline")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = PipelineConfig::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(path) = args.dump_config {
        config.save(&path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }
    setup_logging(&config.logging.level)?;

    println!("╔═══════════════════════════════════════════╗");
    println!("║       Catalog ML - Full Pipeline          ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let summary = pipeline::run_all(&config)?;

    println!("=== Summary ===\n");
    let report = &summary.prepare.report;
    println!(
        "Prepare:  {} -> {} rows, {} cells imputed, {} duplicates removed",
        report.rows_in,
        report.rows_out,
        report.cells_filled(),
        report.duplicates_removed
    );
    println!(
        "Split:    {} train / {} test, {} features",
        summary.split.n_train,
        summary.split.n_test,
        summary.split.feature_names.len()
    );
    println!(
        "Train:    {} trees in {:.2}s",
        summary.train.n_trees, summary.train.elapsed_secs
    );
    let m = &summary.evaluate.metrics;
    println!(
        "Evaluate: MAE {:.4}, MSE {:.4}, R² {:.4}",
        m.mae, m.mse, m.r2
    );
    println!(
        "Figures:  {} written, {} skipped",
        summary.figures.written.len(),
        summary.figures.skipped.len()
    );
    Ok(())
}
