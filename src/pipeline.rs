//! Stage orchestration
//!
//! Each stage reads its input from the configured path, checks that it
//! exists, and writes its output for the next stage:
//!
//! ```text
//! raw CSV --prepare--> processed CSV --split--> X/y train/test CSVs
//!         --train--> model JSON --evaluate--> metrics CSV
//! processed CSV --figures--> PNGs
//! ```

use crate::analysis::{self, CorrelationMatrix};
use crate::cleaning::{self, CleaningReport, MissingSummary};
use crate::config::PipelineConfig;
use crate::data::{Split, Table};
use crate::error::{CatalogError, Result};
use crate::evaluation::{self, RegressionMetrics};
use crate::features::FeatureEngine;
use crate::models::RandomForest;
use crate::viz::{BoxPlot, Canvas, ChartConfig, Heatmap, Histogram, TrendChart, WordCloud};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

pub const TYPE_COLUMN: &str = "type";
pub const YEAR_COLUMN: &str = "release_year";
pub const DESCRIPTION_COLUMN: &str = "description";

pub const HISTOGRAM_FILE: &str = "imdb_score_histogram.png";
pub const CONTENT_TYPE_FILE: &str = "content_type_distribution.png";
pub const TREND_FILE: &str = "imdb_score_trend_by_year.png";
pub const CORRELATION_FILE: &str = "correlation_matrix.png";
pub const WORDCLOUD_FILE: &str = "description_wordcloud.png";

#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub report: CleaningReport,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub n_trees: usize,
    pub n_samples: usize,
    pub n_features: usize,
    pub oob_score: Option<f64>,
    /// Top features by importance
    pub top_features: Vec<(String, f64)>,
    pub elapsed_secs: f64,
    pub model_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EvaluateSummary {
    pub metrics: RegressionMetrics,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FiguresSummary {
    pub n_rows: usize,
    pub missing: Vec<MissingSummary>,
    pub type_counts: Vec<(String, usize)>,
    pub written: Vec<PathBuf>,
    /// Figure file and the reason it was not drawn
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub prepare: PrepareSummary,
    pub split: SplitSummary,
    pub train: TrainSummary,
    pub evaluate: EvaluateSummary,
    pub figures: FiguresSummary,
}

/// Raw CSV to processed CSV: impute, dedup, normalize
pub fn prepare(cfg: &PipelineConfig) -> Result<PrepareSummary> {
    let paths = &cfg.paths;
    info!("Loading raw data from {}", paths.raw_data.display());
    let mut table = Table::load_csv(&paths.raw_data)?;
    info!(
        "Loaded {} rows x {} columns",
        table.n_rows(),
        table.n_columns()
    );

    let report = cleaning::clean(&mut table, &cfg.cleaning)?;
    table.save_csv(&paths.processed_data)?;
    info!("Processed data saved to {}", paths.processed_data.display());

    Ok(PrepareSummary {
        report,
        output: paths.processed_data.clone(),
    })
}

/// Processed CSV to the four modeling CSVs
pub fn split(cfg: &PipelineConfig) -> Result<SplitSummary> {
    let paths = &cfg.paths;
    let table = Table::load_csv(&paths.processed_data)?;
    let dataset = FeatureEngine::new(cfg.features.clone()).build_dataset(&table)?;

    let split = dataset.random_split(cfg.split.test_ratio, cfg.split.seed)?;
    split.save(&paths.modeling_dir)?;
    info!(
        "Split {} samples into {} train / {} test, saved to {}",
        dataset.n_samples(),
        split.train.n_samples(),
        split.test.n_samples(),
        paths.modeling_dir.display()
    );

    Ok(SplitSummary {
        n_train: split.train.n_samples(),
        n_test: split.test.n_samples(),
        feature_names: dataset.feature_names,
        output_dir: paths.modeling_dir.clone(),
    })
}

/// Fit the forest on the training partition and persist it
pub fn train(cfg: &PipelineConfig) -> Result<TrainSummary> {
    let paths = &cfg.paths;
    let train = Split::load_train(&paths.modeling_dir)?;
    info!(
        "Training {} trees on {} samples x {} features",
        cfg.forest.n_estimators,
        train.n_samples(),
        train.n_features()
    );

    let start = Instant::now();
    let mut forest = RandomForest::new(cfg.forest.clone());
    forest.fit(&train)?;
    let elapsed_secs = start.elapsed().as_secs_f64();

    forest.save(&paths.model_file)?;
    info!(
        "Model trained in {:.2}s and saved to {}",
        elapsed_secs,
        paths.model_file.display()
    );

    let top_features = forest
        .feature_importance_ranking()
        .into_iter()
        .take(10)
        .map(|(name, importance)| (name.to_string(), importance))
        .collect();

    Ok(TrainSummary {
        n_trees: forest.n_trees(),
        n_samples: train.n_samples(),
        n_features: train.n_features(),
        oob_score: forest.oob_score(),
        top_features,
        elapsed_secs,
        model_path: paths.model_file.clone(),
    })
}

/// Score the saved model on the test partition and write the metrics CSV
pub fn evaluate(cfg: &PipelineConfig) -> Result<EvaluateSummary> {
    let paths = &cfg.paths;
    let model = RandomForest::load(&paths.model_file)?;
    let test = Split::load_test(&paths.modeling_dir)?;

    let metrics = evaluation::evaluate(&model, &test)?;
    metrics.save_csv(&paths.metrics_file)?;
    info!(
        "Test MAE {:.4}, MSE {:.4}, R² {:.4}; metrics saved to {}",
        metrics.mae,
        metrics.mse,
        metrics.r2,
        paths.metrics_file.display()
    );

    Ok(EvaluateSummary {
        metrics,
        output: paths.metrics_file.clone(),
    })
}

/// Descriptive figures from the processed CSV
///
/// A figure whose columns are absent or of the wrong type is skipped with a
/// warning; the other figures are still written.
pub fn figures(cfg: &PipelineConfig) -> Result<FiguresSummary> {
    let paths = &cfg.paths;
    let fig = &cfg.figures;
    let score = cfg.features.target.as_str();

    let mut table = Table::load_csv(&paths.processed_data)?;
    if let Some(max_rows) = fig.max_rows {
        if table.n_rows() > max_rows {
            info!("Downsampling {} rows to {}", table.n_rows(), max_rows);
            table = table.sample(max_rows, fig.seed);
        }
    }

    let chart = ChartConfig::new(fig.width, fig.height);
    let mut summary = FiguresSummary {
        n_rows: table.n_rows(),
        missing: cleaning::missing_report(&table),
        ..Default::default()
    };
    summary.type_counts = analysis::value_counts(&table, TYPE_COLUMN).unwrap_or_else(|e| {
        warn!("No content type counts: {}", e);
        Vec::new()
    });

    let dir = &paths.figures_dir;
    let table = &table;

    render_figure(dir, HISTOGRAM_FILE, &mut summary, || {
        let column = table.column(score)?.as_numeric()?;
        let values: Vec<f64> = column.iter().flatten().copied().collect();
        Ok(Histogram::new(chart.clone(), fig.histogram_bins)
            .title("IMDB score distribution")
            .x_label(score)
            .render(&values))
    })?;

    render_figure(dir, CONTENT_TYPE_FILE, &mut summary, || {
        let groups = analysis::group_values(table, TYPE_COLUMN, score)?;
        Ok(BoxPlot::new(chart.clone())
            .title("IMDB score by content type")
            .labels(TYPE_COLUMN, score)
            .render(&groups))
    })?;

    render_figure(dir, TREND_FILE, &mut summary, || {
        let trend = analysis::yearly_trend(table, YEAR_COLUMN, score)?;
        Ok(TrendChart::new(chart.clone())
            .title("Titles and IMDB score by year")
            .render(&trend))
    })?;

    render_figure(dir, CORRELATION_FILE, &mut summary, || {
        let matrix: CorrelationMatrix = analysis::correlation_matrix(table)?;
        Ok(Heatmap::new(chart.clone())
            .title("Correlation matrix")
            .render(&matrix))
    })?;

    render_figure(dir, WORDCLOUD_FILE, &mut summary, || {
        let texts = analysis::text_values(table, DESCRIPTION_COLUMN)?;
        let words = analysis::word_frequencies(texts, fig.wordcloud_words);
        Ok(WordCloud::new(chart.clone())
            .title("Description word cloud")
            .render(&words))
    })?;

    info!(
        "Wrote {} figures to {} ({} skipped)",
        summary.written.len(),
        dir.display(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn render_figure<F>(dir: &Path, file: &str, summary: &mut FiguresSummary, render: F) -> Result<()>
where
    F: FnOnce() -> Result<Canvas>,
{
    match render() {
        Ok(canvas) => {
            let path = dir.join(file);
            canvas.save(&path)?;
            info!("Saved {}", path.display());
            summary.written.push(path);
            Ok(())
        }
        Err(e @ (CatalogError::ColumnNotFound(_) | CatalogError::InvalidColumnType { .. })) => {
            warn!("Skipping {}: {}", file, e);
            summary.skipped.push((file.to_string(), e.to_string()));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Every stage in order
pub fn run_all(cfg: &PipelineConfig) -> Result<PipelineSummary> {
    info!("Stage 1/5: prepare");
    let prepare = prepare(cfg)?;
    info!("Stage 2/5: split");
    let split = split(cfg)?;
    info!("Stage 3/5: train");
    let train = train(cfg)?;
    info!("Stage 4/5: evaluate");
    let evaluate = evaluate(cfg)?;
    info!("Stage 5/5: figures");
    let figures = figures(cfg)?;

    Ok(PipelineSummary {
        prepare,
        split,
        train,
        evaluate,
        figures,
    })
}
