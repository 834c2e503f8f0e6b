//! End-to-end run of every stage on a small synthetic catalog

use catalog_ml::cleaning::ImputeStrategy;
use catalog_ml::data::{Split, Table};
use catalog_ml::pipeline;
use catalog_ml::PipelineConfig;
use std::fs;
use std::path::Path;

const HEADER: [&str; 12] = [
    "id",
    "title",
    "type",
    "description",
    "release_year",
    "age_certification",
    "runtime",
    "genres",
    "production_countries",
    "seasons",
    "imdb_score",
    "imdb_votes",
];

const WORDS: [&str; 8] = [
    "detective", "family", "secret", "journey", "love", "murder", "school", "island",
];

fn write_catalog(path: &Path, n: usize) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(HEADER).unwrap();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for i in 0..n {
        let show = i % 3 == 0;
        let runtime = 20 + (i * 7) % 120;
        let score = 4.0 + runtime as f64 / 30.0 + if show { 1.0 } else { 0.0 };
        let description = if i % 11 == 5 {
            String::new()
        } else {
            format!(
                "A {} story about a {} and the {}.",
                WORDS[i % 8],
                WORDS[(i * 3) % 8],
                WORDS[(i * 5 + 1) % 8]
            )
        };

        rows.push(vec![
            format!("ts{i}"),
            format!("Title {i}"),
            if show { "SHOW" } else { "MOVIE" }.to_string(),
            description,
            (2000 + i % 20).to_string(),
            ["PG", "R", "TV-MA", ""][i % 4].to_string(),
            runtime.to_string(),
            ["['drama']", "['comedy', 'drama']", "['thriller']"][i % 3].to_string(),
            ["['US']", "['GB', 'US']"][i % 2].to_string(),
            if show { (1 + i % 5).to_string() } else { String::new() },
            // every 13th score is missing and gets imputed
            if i % 13 == 7 { String::new() } else { format!("{score:.1}") },
            (100 * (i + 1)).to_string(),
        ]);
    }
    // one exact duplicate
    rows.push(rows[4].clone());

    for row in rows {
        writer.write_record(&row).unwrap();
    }
    writer.flush().unwrap();
}

fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.paths.raw_data = dir.join("data/raw/catalog.csv");
    config.paths.processed_data = dir.join("data/processed/catalog.csv");
    config.paths.modeling_dir = dir.join("data/modeling");
    config.paths.model_file = dir.join("models/random_forest_imdb.json");
    config.paths.metrics_file = dir.join("models/evaluation_metrics.csv");
    config.paths.figures_dir = dir.join("figures");
    config.forest.n_estimators = 20;
    config.forest.oob_score = true;
    config.figures.width = 400;
    config.figures.height = 300;
    config
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::create_dir_all(dir.path().join("data/raw")).unwrap();
    write_catalog(&config.paths.raw_data, 60);

    let summary = pipeline::run_all(&config).unwrap();

    // prepare: duplicate dropped, numeric gaps filled, text gaps kept
    let report = &summary.prepare.report;
    assert_eq!(report.rows_in, 61);
    assert_eq!(report.rows_out, 60);
    assert_eq!(report.duplicates_removed, 1);
    let processed = Table::load_csv(&config.paths.processed_data).unwrap();
    for name in ["seasons", "imdb_score", "runtime"] {
        assert_eq!(processed.column(name).unwrap().data.missing_count(), 0, "{name}");
    }
    assert!(processed.column("description").unwrap().data.missing_count() > 0);

    // split: 20% of 60 rows held out, indicator columns after numeric ones
    assert_eq!(summary.split.n_test, 12);
    assert_eq!(summary.split.n_train, 48);
    let names = &summary.split.feature_names;
    assert_eq!(&names[..4], ["release_year", "runtime", "seasons", "imdb_votes"]);
    assert!(names.iter().any(|n| n.starts_with("genres_")));
    let split = Split::load(&config.paths.modeling_dir).unwrap();
    assert_eq!(split.train.n_samples(), 48);
    assert_eq!(split.test.feature_names, *names);

    // train + evaluate
    assert_eq!(summary.train.n_trees, 20);
    assert!(summary.train.oob_score.is_some());
    assert!(config.paths.model_file.exists());
    let metrics = &summary.evaluate.metrics;
    assert_eq!(metrics.n_samples, 12);
    assert!(metrics.mae.is_finite() && metrics.mse >= 0.0);
    assert!(metrics.r2 > 0.0, "r2 = {}", metrics.r2);
    let csv = fs::read_to_string(&config.paths.metrics_file).unwrap();
    assert_eq!(csv.lines().next(), Some("MAE,MSE,R2"));

    // figures
    assert!(summary.figures.skipped.is_empty());
    for file in [
        pipeline::HISTOGRAM_FILE,
        pipeline::CONTENT_TYPE_FILE,
        pipeline::TREND_FILE,
        pipeline::CORRELATION_FILE,
        pipeline::WORDCLOUD_FILE,
    ] {
        assert!(config.paths.figures_dir.join(file).exists(), "{file}");
    }
    assert_eq!(summary.figures.type_counts[0], ("MOVIE".to_string(), 40));
}

#[test]
fn test_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.cleaning.strategy = ImputeStrategy::Median;
    fs::create_dir_all(dir.path().join("data/raw")).unwrap();
    write_catalog(&config.paths.raw_data, 40);

    pipeline::prepare(&config).unwrap();
    pipeline::split(&config).unwrap();
    pipeline::train(&config).unwrap();
    let first = fs::read_to_string(&config.paths.model_file).unwrap();

    pipeline::split(&config).unwrap();
    pipeline::train(&config).unwrap();
    let second = fs::read_to_string(&config.paths.model_file).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_config_round_trip_drives_stages() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.split.test_ratio = 0.25;
    config.cleaning.normalize_columns = vec!["runtime".to_string()];

    let path = dir.path().join("pipeline.toml");
    config.save(&path).unwrap();
    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded.split.test_ratio, 0.25);
    assert_eq!(loaded.cleaning.normalize_columns, vec!["runtime"]);

    fs::create_dir_all(dir.path().join("data/raw")).unwrap();
    write_catalog(&loaded.paths.raw_data, 40);
    pipeline::prepare(&loaded).unwrap();

    let processed = Table::load_csv(&loaded.paths.processed_data).unwrap();
    let runtime = processed.column("runtime").unwrap().as_numeric().unwrap();
    let max = runtime.iter().flatten().copied().fold(f64::MIN, f64::max);
    let min = runtime.iter().flatten().copied().fold(f64::MAX, f64::min);
    assert_eq!((min, max), (0.0, 1.0));

    let split = pipeline::split(&loaded).unwrap();
    assert_eq!(split.n_test, 10);
}
