//! Render the exploratory figures from the processed catalog
//!
//! Usage: cargo run --bin make_figures -- --max-rows 2000

use anyhow::Result;
use catalog_ml::logging::setup_logging;
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Write histogram, box plot, trend, correlation and word cloud PNGs")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processed CSV to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the PNG files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Downsample to at most this many rows before plotting
    #[arg(long)]
    max_rows: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PipelineConfig::load_or_default(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.paths.processed_data = input;
    }
    if let Some(dir) = args.output_dir {
        config.paths.figures_dir = dir;
    }
    if args.max_rows.is_some() {
        config.figures.max_rows = args.max_rows;
    }
    setup_logging(&config.logging.level)?;

    println!("===========================================");
    println!("  Exploratory Figures - Catalog ML");
    println!("===========================================\n");

    let summary = pipeline::figures(&config)?;

    println!("Rows analysed: {}\n", summary.n_rows);
    println!("{:<24} {:>8} {:>8}", "Column", "Missing", "%");
    for m in &summary.missing {
        println!("{:<24} {:>8} {:>7.2}%", m.column, m.missing, m.percentage);
    }

    if !summary.type_counts.is_empty() {
        println!("\nContent types:");
        for (kind, count) in &summary.type_counts {
            println!("  {:<10} {}", kind, count);
        }
    }

    println!();
    for path in &summary.written {
        println!("Saved {}", path.display());
    }
    for (file, reason) in &summary.skipped {
        println!("Skipped {}: {}", file, reason);
    }
    Ok(())
}
