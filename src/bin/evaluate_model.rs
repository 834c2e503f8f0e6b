//! Evaluate the saved model on the test split
//!
//! Usage: cargo run --bin evaluate_model

use anyhow::Result;
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score the trained model on the held-out split")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model file to load
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Metrics CSV to write
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.paths.model_file = model;
    }
    if let Some(output) = args.output {
        config.paths.metrics_file = output;
    }
    setup_logging(&config.logging.level)?;

    println!("===========================================");
    println!("  Model Evaluation - Catalog ML");
    println!("===========================================\n");

    let summary = pipeline::evaluate(&config)?;
    summary.metrics.print_report();

    println!(
        "\nEvaluation metrics saved to {}",
        summary.output.display()
    );
    Ok(())
}
