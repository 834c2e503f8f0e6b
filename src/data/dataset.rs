//! Dataset structure for machine learning

use crate::error::{CatalogError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Dataset for machine learning with features and labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Regression targets
    pub labels: Vec<f64>,
    /// Feature names
    pub feature_names: Vec<String>,
    /// Name of the target column
    pub target_name: String,
}

/// Train/test split result
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// Create a new empty dataset
    pub fn new(feature_names: Vec<String>, target_name: impl Into<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
            target_name: target_name.into(),
        }
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add a sample
    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) -> Result<()> {
        if features.len() != self.n_features() {
            return Err(CatalogError::ShapeMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        self.features.push(features);
        self.labels.push(label);
        Ok(())
    }

    /// Get feature matrix as ndarray
    pub fn features_array(&self) -> Array2<f64> {
        let n_samples = self.n_samples();
        let n_features = self.n_features();

        if n_samples == 0 {
            return Array2::zeros((0, n_features));
        }

        Array2::from_shape_fn((n_samples, n_features), |(i, j)| self.features[i][j])
    }

    /// Get labels as ndarray
    pub fn labels_array(&self) -> Array1<f64> {
        Array1::from_vec(self.labels.clone())
    }

    /// Shuffled split with `ceil(test_ratio * n)` test samples
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Result<Split> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(CatalogError::invalid(format!(
                "test ratio must be in (0, 1), got {test_ratio}"
            )));
        }

        let n = self.n_samples();
        let test_size = (test_ratio * n as f64).ceil() as usize;
        if test_size == 0 || test_size >= n {
            return Err(CatalogError::empty(format!(
                "cannot split {n} samples with test ratio {test_ratio}"
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let (test_indices, train_indices) = indices.split_at(test_size);

        Ok(Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        })
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
        }
    }

    /// Save the feature matrix to CSV (header = feature names)
    pub fn save_features_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.feature_names)?;

        for row in &self.features {
            let record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Save the labels to a single-column CSV (header = target name)
    pub fn save_labels_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([self.target_name.as_str()])?;

        for label in &self.labels {
            writer.write_record([label.to_string()])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load from a feature CSV and a matching label CSV
    pub fn load_csv(features_path: &Path, labels_path: &Path) -> Result<Self> {
        CatalogError::ensure_exists(features_path)?;
        CatalogError::ensure_exists(labels_path)?;

        let mut reader = csv::Reader::from_path(features_path)?;
        let feature_names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut features = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|s| parse_cell(s, features_path))
                .collect::<Result<Vec<f64>>>()?;
            features.push(row);
        }

        let mut reader = csv::Reader::from_path(labels_path)?;
        let target_name = reader
            .headers()?
            .get(0)
            .map(|s| s.to_string())
            .ok_or_else(|| CatalogError::invalid("label file has no header"))?;

        let mut labels = Vec::new();
        for result in reader.records() {
            let record = result?;
            labels.push(parse_cell(record.get(0).unwrap_or(""), labels_path)?);
        }

        if labels.len() != features.len() {
            return Err(CatalogError::ShapeMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }

        Ok(Dataset {
            features,
            labels,
            feature_names,
            target_name,
        })
    }
}

fn parse_cell(cell: &str, path: &Path) -> Result<f64> {
    cell.trim().parse().map_err(|_| {
        CatalogError::invalid(format!(
            "non-numeric value '{cell}' in {}",
            path.display()
        ))
    })
}

impl Split {
    pub const X_TRAIN: &'static str = "X_train.csv";
    pub const X_TEST: &'static str = "X_test.csv";
    pub const Y_TRAIN: &'static str = "y_train.csv";
    pub const Y_TEST: &'static str = "y_test.csv";

    /// Write the four partition files into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        self.train.save_features_csv(&dir.join(Self::X_TRAIN))?;
        self.test.save_features_csv(&dir.join(Self::X_TEST))?;
        self.train.save_labels_csv(&dir.join(Self::Y_TRAIN))?;
        self.test.save_labels_csv(&dir.join(Self::Y_TEST))?;
        Ok(())
    }

    /// Read both partitions written by [`Split::save`]
    pub fn load(dir: &Path) -> Result<Split> {
        Ok(Split {
            train: Self::load_train(dir)?,
            test: Self::load_test(dir)?,
        })
    }

    /// Read the training partition written by [`Split::save`]
    pub fn load_train(dir: &Path) -> Result<Dataset> {
        Dataset::load_csv(&dir.join(Self::X_TRAIN), &dir.join(Self::Y_TRAIN))
    }

    /// Read the test partition written by [`Split::save`]
    pub fn load_test(dir: &Path) -> Result<Dataset> {
        Dataset::load_csv(&dir.join(Self::X_TEST), &dir.join(Self::Y_TEST))
    }
}
