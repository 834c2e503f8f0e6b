//! Error types for the catalog pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An input file a stage depends on does not exist
    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Referenced column is not in the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Column exists but holds the wrong kind of values
    #[error("Column '{column}' is {actual}, expected {expected}")]
    InvalidColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation needs at least one row
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Two sequences or matrices disagree in size
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Model used before `fit`
    #[error("Model is not fitted")]
    ModelNotFitted,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write error
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// PNG encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CatalogError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        Self::EmptyDataset(msg.into())
    }

    /// Check that a stage input exists before reading it
    pub fn ensure_exists(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self::MissingInput(path.to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let err = CatalogError::ensure_exists(std::path::Path::new("no/such/file.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::MissingInput(_)));
        assert_eq!(err.to_string(), "Input not found: no/such/file.csv");
    }

    #[test]
    fn test_column_type_message() {
        let err = CatalogError::InvalidColumnType {
            column: "genres".to_string(),
            expected: "numeric",
            actual: "text",
        };
        assert_eq!(err.to_string(), "Column 'genres' is text, expected numeric");
    }
}
