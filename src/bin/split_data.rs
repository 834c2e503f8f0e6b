//! Build the feature matrix and split it into train/test CSVs
//!
//! Usage: cargo run --bin split_data -- --test-ratio 0.2 --seed 42

use anyhow::Result;
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "One-hot encode features and write the train/test split")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processed CSV to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for X_train/X_test/y_train/y_test
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fraction of rows held out for testing
    #[arg(long)]
    test_ratio: Option<f64>,

    /// Shuffle seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.paths.processed_data = input;
    }
    if let Some(dir) = args.output_dir {
        config.paths.modeling_dir = dir;
    }
    if let Some(ratio) = args.test_ratio {
        config.split.test_ratio = ratio;
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
    }
    config.validate()?;
    setup_logging(&config.logging.level)?;

    println!("===========================================");
    println!("  Train/Test Split - Catalog ML");
    println!("===========================================\n");

    let summary = pipeline::split(&config)?;

    println!("Features:  {}", summary.feature_names.len());
    println!("Train set: {} samples", summary.n_train);
    println!("Test set:  {} samples", summary.n_test);
    println!(
        "\nSplit complete, files saved to {}",
        summary.output_dir.display()
    );
    Ok(())
}
