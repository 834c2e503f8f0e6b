//! # Catalog ML - IMDB score regression on a streaming catalog
//!
//! This library cleans a raw catalog of movies and shows, builds a feature
//! matrix, trains a Random Forest regressor on the IMDB score and renders
//! descriptive figures.
//!
//! ## Modules
//!
//! - `data` - Raw tables and model-ready datasets
//! - `cleaning` - Imputation, duplicate removal and min-max scaling
//! - `features` - Feature selection and one-hot encoding
//! - `models` - Decision Tree and Random Forest implementations
//! - `evaluation` - Regression metrics
//! - `analysis` - Descriptive statistics for the figures
//! - `viz` - PNG chart rendering
//! - `pipeline` - The stages run by the binaries

pub mod analysis;
pub mod cleaning;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod viz;

pub use config::PipelineConfig;
pub use data::{Dataset, Table};
pub use error::{CatalogError, Result};
pub use features::FeatureEngine;
pub use models::{DecisionTree, RandomForest};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cleaning::{
        clean, fill_missing_values, normalize_column, remove_duplicates, ImputeStrategy,
    };
    pub use crate::config::PipelineConfig;
    pub use crate::data::{Column, ColumnData, Dataset, Split, Table};
    pub use crate::error::{CatalogError, Result};
    pub use crate::evaluation::RegressionMetrics;
    pub use crate::features::{FeatureEngine, FeatureSpec, OneHotEncoder};
    pub use crate::models::{DecisionTree, ForestConfig, RandomForest, TreeConfig};
}
