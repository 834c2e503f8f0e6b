//! Regression metrics for evaluating model performance

use crate::data::Dataset;
use crate::error::{CatalogError, Result};
use crate::models::RandomForest;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Collection of regression metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// R-squared (coefficient of determination)
    pub r2: f64,
    /// Number of samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Calculate all regression metrics
    pub fn calculate(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(CatalogError::ShapeMismatch {
                expected: y_true.len(),
                actual: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(CatalogError::empty("no samples to evaluate"));
        }

        let mse = Self::mean_squared_error(y_true, y_pred);
        Ok(Self {
            mae: Self::mean_absolute_error(y_true, y_pred),
            mse,
            rmse: mse.sqrt(),
            r2: Self::r_squared(y_true, y_pred),
            n_samples: y_true.len(),
        })
    }

    pub fn from_slices(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Self::calculate(
            &Array1::from_vec(y_true.to_vec()),
            &Array1::from_vec(y_pred.to_vec()),
        )
    }

    /// Mean Squared Error: (1/n) * Σ(y_true - y_pred)²
    pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let diff = y_true - y_pred;
        diff.mapv(|d| d * d).mean().unwrap_or(0.0)
    }

    /// Mean Absolute Error: (1/n) * Σ|y_true - y_pred|
    pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let diff = y_true - y_pred;
        diff.mapv(f64::abs).mean().unwrap_or(0.0)
    }

    /// R² = 1 - SS_res / SS_tot
    ///
    /// For a constant target: 1.0 on a perfect fit, 0.0 otherwise.
    pub fn r_squared(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let y_mean = y_true.mean().unwrap_or(0.0);

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - y_mean).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - ss_res / ss_tot
    }

    /// Write a one-row CSV with columns `MAE,MSE,R2`
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["MAE", "MSE", "R2"])?;
        writer.write_record([
            self.mae.to_string(),
            self.mse.to_string(),
            self.r2.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Print formatted metrics
    pub fn print_report(&self) {
        println!("=== Model Evaluation ===");
        println!("Samples:                   {}", self.n_samples);
        println!("MAE  (mean absolute error): {:.4}", self.mae);
        println!("MSE  (mean squared error):  {:.4}", self.mse);
        println!("RMSE:                       {:.4}", self.rmse);
        println!("R² score:                   {:.4}", self.r2);
    }
}

/// Score a fitted forest on a held-out dataset
pub fn evaluate(model: &RandomForest, dataset: &Dataset) -> Result<RegressionMetrics> {
    let predictions = model.predict(dataset)?;
    RegressionMetrics::calculate(&dataset.labels_array(), &Array1::from_vec(predictions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let metrics = RegressionMetrics::calculate(&y, &y).unwrap();

        assert_relative_eq!(metrics.mse, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.mae, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.r2, 1.0, epsilon = 1e-10);
        assert_eq!(metrics.n_samples, 5);
    }

    #[test]
    fn test_known_values() {
        let y_true = array![3.0, -0.5, 2.0, 7.0];
        let y_pred = array![2.5, 0.0, 2.0, 8.0];
        let metrics = RegressionMetrics::calculate(&y_true, &y_pred).unwrap();

        assert_relative_eq!(metrics.mae, 0.5);
        assert_relative_eq!(metrics.mse, 0.375);
        assert_relative_eq!(metrics.rmse, 0.375f64.sqrt());
        assert_relative_eq!(metrics.r2, 0.948_608_137_044_967_9, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![2.0, 2.0, 2.0];
        assert_eq!(RegressionMetrics::r_squared(&y_true, &y_true), 1.0);
        assert_eq!(
            RegressionMetrics::r_squared(&y_true, &array![2.0, 2.5, 2.0]),
            0.0
        );
    }

    #[test]
    fn test_input_guards() {
        assert!(matches!(
            RegressionMetrics::from_slices(&[1.0, 2.0], &[1.0]),
            Err(CatalogError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            RegressionMetrics::from_slices(&[], &[]),
            Err(CatalogError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_save_csv() {
        let metrics = RegressionMetrics::from_slices(&[1.0, 3.0], &[2.0, 3.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("evaluation_metrics.csv");
        metrics.save_csv(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("MAE,MSE,R2"));
        assert_eq!(lines.next(), Some("0.5,0.5,0.5"));
    }
}
