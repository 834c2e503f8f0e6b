//! Clean the raw catalog CSV
//!
//! Usage: cargo run --bin prepare_data -- --strategy median --normalize runtime

use anyhow::Result;
use catalog_ml::cleaning::ImputeStrategy;
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Impute, deduplicate and normalize the raw catalog")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw CSV to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Processed CSV to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Imputation strategy: mean, median, mode, constant or a number
    #[arg(short, long)]
    strategy: Option<ImputeStrategy>,

    /// Keep duplicate rows
    #[arg(long)]
    keep_duplicates: bool,

    /// Column to min-max scale (repeatable)
    #[arg(long)]
    normalize: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.paths.raw_data = input;
    }
    if let Some(output) = args.output {
        config.paths.processed_data = output;
    }
    if let Some(strategy) = args.strategy {
        config.cleaning.strategy = strategy;
    }
    if args.keep_duplicates {
        config.cleaning.remove_duplicates = false;
    }
    config.cleaning.normalize_columns.extend(args.normalize);
    setup_logging(&config.logging.level)?;

    println!("===========================================");
    println!("  Data Preparation - Catalog ML");
    println!("===========================================\n");

    let summary = pipeline::prepare(&config)?;
    let report = &summary.report;

    println!("Rows:       {} -> {}", report.rows_in, report.rows_out);
    println!("Strategy:   {}", config.cleaning.strategy);
    println!("Duplicates: {} removed", report.duplicates_removed);

    println!("\nImputed columns:");
    for fill in report.fills.iter().filter(|f| f.filled > 0 || f.value.is_none()) {
        match fill.value {
            Some(value) => println!("  {:<24} {:>6} cells <- {:.4}", fill.column, fill.filled, value),
            None => println!("  {:<24} no observed values, left as-is", fill.column),
        }
    }

    for (column, range) in &report.normalized {
        match range {
            Some(r) => println!("Normalized {} from [{}, {}]", column, r.min, r.max),
            None => println!("Normalized {}: no observed values", column),
        }
    }

    println!("\nProcessed data saved to {}", summary.output.display());
    Ok(())
}
