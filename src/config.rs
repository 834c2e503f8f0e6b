//! Configuration management
//!
//! Every stage reads the same `PipelineConfig`. Defaults reproduce the
//! relative layout the pipeline has always used, so running the binaries
//! from the project root needs no config file at all.

use crate::cleaning::ImputeStrategy;
use crate::error::{CatalogError, Result};
use crate::features::FeatureSpec;
use crate::models::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File locations for every stage handoff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub modeling_dir: PathBuf,
    pub model_file: PathBuf,
    pub metrics_file: PathBuf,
    pub figures_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_data: PathBuf::from("data/raw/NetflixTVShowsandMovies.csv"),
            processed_data: PathBuf::from("data/processed/ProcessedNetflixTVShowsandMovies.csv"),
            modeling_dir: PathBuf::from("data/modeling"),
            model_file: PathBuf::from("models/random_forest_imdb.json"),
            metrics_file: PathBuf::from("models/evaluation_metrics.csv"),
            figures_dir: PathBuf::from("figures"),
        }
    }
}

/// Cleaning stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub strategy: ImputeStrategy,
    pub remove_duplicates: bool,
    /// Columns min-max scaled after imputation
    pub normalize_columns: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            strategy: ImputeStrategy::Mean,
            remove_duplicates: true,
            normalize_columns: Vec::new(),
        }
    }
}

/// Train/test split configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Figure rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiguresConfig {
    pub width: u32,
    pub height: u32,
    pub histogram_bins: usize,
    pub wordcloud_words: usize,
    /// Downsample the table before plotting
    pub max_rows: Option<usize>,
    pub seed: u64,
}

impl Default for FiguresConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            histogram_bins: 20,
            wordcloud_words: 80,
            max_rows: None,
            seed: 42,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub cleaning: CleaningConfig,
    pub features: FeatureSpec,
    pub split: SplitConfig,
    pub forest: ForestConfig,
    pub figures: FiguresConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        CatalogError::ensure_exists(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values no stage can run with
    pub fn validate(&self) -> Result<()> {
        let ratio = self.split.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(CatalogError::Config(format!(
                "split.test_ratio must be in (0, 1), got {ratio}"
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(CatalogError::Config(
                "forest.n_estimators must be at least 1".to_string(),
            ));
        }
        if self.forest.min_samples_split < 2 || self.forest.min_samples_leaf < 1 {
            return Err(CatalogError::Config(
                "forest.min_samples_split must be >= 2 and min_samples_leaf >= 1".to_string(),
            ));
        }
        if self.features.target.is_empty() {
            return Err(CatalogError::Config("features.target is empty".to_string()));
        }
        if self.figures.histogram_bins == 0 {
            return Err(CatalogError::Config(
                "figures.histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.split.test_ratio, 0.2);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.cleaning.strategy, ImputeStrategy::Mean);
        assert_eq!(config.features.target, "imdb_score");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.paths.model_file, config.paths.model_file);
        assert_eq!(parsed.features.categorical, config.features.categorical);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: PipelineConfig = toml::from_str(
            r#"
            [cleaning]
            strategy = "median"
            normalize_columns = ["imdb_votes"]

            [split]
            test_ratio = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(parsed.cleaning.strategy, ImputeStrategy::Median);
        assert!(parsed.cleaning.remove_duplicates);
        assert_eq!(parsed.split.test_ratio, 0.25);
        assert_eq!(parsed.split.seed, 42);
        assert_eq!(parsed.forest.n_estimators, 100);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = PipelineConfig::default();
        config.split.test_ratio = 1.5;
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(CatalogError::MissingInput(_))
        ));

        PipelineConfig::default().save(&path).unwrap();
        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded.paths.figures_dir, PathBuf::from("figures"));
    }
}
