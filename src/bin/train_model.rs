//! Train the Random Forest regressor on the training split
//!
//! Usage: cargo run --release --bin train_model -- --trees 100 --max-depth 12

use anyhow::Result;
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a Random Forest on the catalog training split")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trees
    #[arg(short, long)]
    trees: Option<usize>,

    /// Max tree depth (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Features tried per split (all when omitted)
    #[arg(long)]
    max_features: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Report the out-of-bag R²
    #[arg(long)]
    oob: bool,

    /// Where to write the model
    #[arg(short, long)]
    model: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(trees) = args.trees {
        config.forest.n_estimators = trees;
    }
    if args.max_depth.is_some() {
        config.forest.max_depth = args.max_depth;
    }
    if args.max_features.is_some() {
        config.forest.max_features = args.max_features;
    }
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    if args.oob {
        config.forest.oob_score = true;
    }
    if let Some(model) = args.model {
        config.paths.model_file = model;
    }
    config.validate()?;
    setup_logging(&config.logging.level)?;

    println!("===========================================");
    println!("  Random Forest Training - Catalog ML");
    println!("===========================================\n");

    println!(
        "Training Random Forest with {} trees...",
        config.forest.n_estimators
    );
    println!("(This may take a moment)\n");

    let summary = pipeline::train(&config)?;

    println!(
        "Training completed in {:.2}s on {} samples x {} features\n",
        summary.elapsed_secs, summary.n_samples, summary.n_features
    );
    if let Some(oob) = summary.oob_score {
        println!("OOB R²: {:.4}\n", oob);
    }

    println!("Top Feature Importances:");
    for (i, (name, importance)) in summary.top_features.iter().enumerate() {
        let bar = "█".repeat((importance * 50.0) as usize);
        println!("  {:2}. {:30} {:.4} {}", i + 1, name, importance, bar);
    }

    println!("\nModel saved to {}", summary.model_path.display());
    Ok(())
}
