//! Random Forest implementation

use super::decision_tree::{DecisionTree, TreeConfig};
use crate::data::Dataset;
use crate::error::{CatalogError, Result};
use crate::evaluation::RegressionMetrics;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
    /// Out-of-bag score calculation
    pub oob_score: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
            oob_score: false,
        }
    }
}

/// Random Forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    target_name: String,
    feature_importances: Vec<f64>,
    oob_score_value: Option<f64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            target_name: String::new(),
            feature_importances: Vec::new(),
            oob_score_value: None,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train the random forest
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        let n_samples = dataset.n_samples();
        if n_samples == 0 {
            return Err(CatalogError::empty("cannot fit a forest on zero samples"));
        }
        if self.config.n_estimators == 0 {
            return Err(CatalogError::invalid("n_estimators must be at least 1"));
        }

        self.feature_names = dataset.feature_names.clone();
        self.target_name = dataset.target_name.clone();
        let n_features = dataset.n_features();

        // Build trees in parallel
        let trees: Vec<DecisionTree> = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|i| -> Result<DecisionTree> {
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: self.config.max_features,
                    seed: tree_seed(self.config.seed, i),
                };

                let mut tree = DecisionTree::new(tree_config);

                // Bootstrap sample or use full dataset
                if self.config.bootstrap {
                    let indices = self.bootstrap_indices(n_samples, i);
                    tree.fit_indices(dataset, &indices)?;
                } else {
                    tree.fit(dataset)?;
                }

                Ok(tree)
            })
            .collect::<Result<_>>()?;

        self.trees = trees;

        // Aggregate feature importances
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }

        // Normalize
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        self.oob_score_value = if self.config.oob_score && self.config.bootstrap {
            self.calculate_oob_score(dataset)
        } else {
            None
        };

        info!(
            "Fitted {} trees on {} samples x {} features",
            self.trees.len(),
            n_samples,
            n_features
        );
        debug!(
            "Mean tree depth {:.1}, mean leaves {:.1}",
            self.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / self.trees.len() as f64,
            self.trees.iter().map(|t| t.n_leaves() as f64).sum::<f64>() / self.trees.len() as f64
        );

        Ok(())
    }

    /// Rows drawn with replacement for tree `tree_idx`
    fn bootstrap_indices(&self, n: usize, tree_idx: usize) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(tree_idx as u64));
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// R² of each sample's prediction by the trees that did not see it
    fn calculate_oob_score(&self, dataset: &Dataset) -> Option<f64> {
        let n_samples = dataset.n_samples();
        let mut sums = vec![0.0; n_samples];
        let mut counts = vec![0usize; n_samples];

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            let mut in_bag = vec![false; n_samples];
            for i in self.bootstrap_indices(n_samples, tree_idx) {
                in_bag[i] = true;
            }

            for i in (0..n_samples).filter(|&i| !in_bag[i]) {
                sums[i] += tree.predict_one(&dataset.features[i]);
                counts[i] += 1;
            }
        }

        let (y_true, y_pred): (Vec<f64>, Vec<f64>) = (0..n_samples)
            .filter(|&i| counts[i] > 0)
            .map(|i| (dataset.labels[i], sums[i] / counts[i] as f64))
            .unzip();

        if y_true.is_empty() {
            return None;
        }

        Some(RegressionMetrics::r_squared(&y_true.into(), &y_pred.into()))
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(CatalogError::ModelNotFitted);
        }
        if width != self.feature_names.len() {
            return Err(CatalogError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: width,
            });
        }
        Ok(())
    }

    fn mean_prediction(&self, features: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict_one(features)).sum::<f64>() / self.trees.len() as f64
    }

    /// Predict for a single sample (mean over trees)
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        self.check_width(features.len())?;
        Ok(self.mean_prediction(features))
    }

    /// Predict for multiple samples
    ///
    /// The dataset's feature columns must match the training columns.
    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<f64>> {
        self.check_width(dataset.n_features())?;
        if dataset.feature_names != self.feature_names {
            return Err(CatalogError::invalid(
                "feature columns differ from the ones the model was trained on",
            ));
        }

        Ok(dataset
            .features
            .par_iter()
            .map(|f| self.mean_prediction(f))
            .collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Get feature names with importances, sorted by importance
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Get OOB score
    pub fn oob_score(&self) -> Option<f64> {
        self.oob_score_value
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Save model to a JSON file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Load model from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        CatalogError::ensure_exists(path)?;
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let forest: RandomForest = serde_json::from_reader(reader)?;
        Ok(forest)
    }

    /// Print summary
    pub fn summary(&self) {
        println!("Random Forest Summary");
        println!("=====================");
        println!("Number of trees: {}", self.n_trees());
        match self.config.max_depth {
            Some(depth) => println!("Max depth: {}", depth),
            None => println!("Max depth: unlimited"),
        }
        println!("Target: {}", self.target_name);

        if let Some(oob) = self.oob_score_value {
            println!("OOB R²: {:.4}", oob);
        }

        println!("\nTop 10 Feature Importances:");
        for (name, importance) in self.feature_importance_ranking().iter().take(10) {
            println!("  {}: {:.4}", name, importance);
        }
    }
}

/// Decorrelate a tree's split RNG from its bootstrap RNG
fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    seed.wrapping_add(tree_idx as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
