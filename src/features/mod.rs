//! Feature selection and encoding
//!
//! Builds the model matrix from the processed catalog table.

mod encoding;

pub use encoding::OneHotEncoder;

use crate::data::{ColumnData, Dataset, Table};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which columns feed the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSpec {
    /// Numeric columns used as-is
    pub numeric: Vec<String>,
    /// Columns expanded into indicator features
    pub categorical: Vec<String>,
    /// Regression target
    pub target: String,
    /// Drop the first category of every encoded column
    pub drop_first: bool,
}

impl Default for FeatureSpec {
    fn default() -> Self {
        Self {
            numeric: vec![
                "release_year".to_string(),
                "runtime".to_string(),
                "seasons".to_string(),
                "imdb_votes".to_string(),
            ],
            categorical: vec![
                "age_certification".to_string(),
                "genres".to_string(),
                "production_countries".to_string(),
            ],
            target: "imdb_score".to_string(),
            drop_first: true,
        }
    }
}

/// Turns a cleaned table into a [`Dataset`]
pub struct FeatureEngine {
    spec: FeatureSpec,
}

impl FeatureEngine {
    pub fn new(spec: FeatureSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    /// Numeric features first, then indicator columns, in declared order
    ///
    /// Listed columns absent from the table are skipped. Rows without a
    /// target are dropped; missing numeric feature cells become 0.
    pub fn build_dataset(&self, table: &Table) -> Result<Dataset> {
        let target = table.column(&self.spec.target)?.as_numeric()?;

        let mut numeric: Vec<(&str, &[Option<f64>])> = Vec::new();
        for name in self.spec.numeric.iter().filter(|n| self.present(table, n)) {
            numeric.push((name.as_str(), table.column(name)?.as_numeric()?));
        }

        let mut encoded: Vec<(OneHotEncoder, &ColumnData)> = Vec::new();
        for name in self.spec.categorical.iter().filter(|n| self.present(table, n)) {
            let column = table.column(name)?;
            encoded.push((OneHotEncoder::fit(column, self.spec.drop_first), &column.data));
        }

        let mut feature_names: Vec<String> =
            numeric.iter().map(|(name, _)| name.to_string()).collect();
        for (encoder, _) in &encoded {
            feature_names.extend(encoder.feature_names());
        }

        if feature_names.is_empty() {
            return Err(CatalogError::invalid(
                "none of the configured feature columns are present",
            ));
        }

        let mut dataset = Dataset::new(feature_names, self.spec.target.clone());
        let mut dropped = 0usize;
        let mut zero_filled = 0usize;

        for row in 0..table.n_rows() {
            let Some(label) = target[row] else {
                dropped += 1;
                continue;
            };

            let mut features = Vec::with_capacity(dataset.n_features());
            for (_, values) in &numeric {
                features.push(values[row].unwrap_or_else(|| {
                    zero_filled += 1;
                    0.0
                }));
            }
            for (encoder, data) in &encoded {
                features.extend(encoder.encode(data.render(row).as_deref()));
            }

            dataset.add_sample(features, label)?;
        }

        if dropped > 0 {
            warn!(
                "Dropped {} rows with missing target '{}'",
                dropped, self.spec.target
            );
        }
        if zero_filled > 0 {
            warn!("{} missing numeric feature cells set to 0", zero_filled);
        }

        info!(
            "Built dataset: {} samples, {} features ({} numeric, {} encoded columns)",
            dataset.n_samples(),
            dataset.n_features(),
            numeric.len(),
            encoded.len()
        );

        Ok(dataset)
    }

    fn present(&self, table: &Table, name: &str) -> bool {
        let present = table.has_column(name);
        if !present {
            debug!("Feature column '{}' not in table, skipping", name);
        }
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::text(
                "title",
                vec![Some("A".into()), Some("B".into()), Some("C".into()), Some("D".into())],
            ),
            Column::numeric("release_year", vec![Some(2001.0), Some(2010.0), None, Some(2020.0)]),
            Column::numeric("runtime", vec![Some(90.0), Some(45.0), Some(30.0), Some(120.0)]),
            Column::text(
                "age_certification",
                vec![Some("PG".into()), None, Some("R".into()), Some("TV-MA".into())],
            ),
            Column::numeric("imdb_score", vec![Some(7.0), Some(6.5), Some(8.1), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_dataset_defaults() {
        let engine = FeatureEngine::new(FeatureSpec::default());
        let dataset = engine.build_dataset(&table()).unwrap();

        // seasons, imdb_votes, genres, production_countries are absent
        assert_eq!(
            dataset.feature_names,
            vec![
                "release_year",
                "runtime",
                "age_certification_R",
                "age_certification_TV-MA"
            ]
        );

        // row D has no score
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.labels, vec![7.0, 6.5, 8.1]);
        assert_eq!(dataset.features[0], vec![2001.0, 90.0, 0.0, 0.0]);
        assert_eq!(dataset.features[1], vec![2010.0, 45.0, 0.0, 0.0]);
        assert_eq!(dataset.features[2], vec![0.0, 30.0, 1.0, 0.0]);
        assert_eq!(dataset.target_name, "imdb_score");
    }

    #[test]
    fn test_keep_first_category() {
        let engine = FeatureEngine::new(FeatureSpec {
            drop_first: false,
            ..Default::default()
        });
        let dataset = engine.build_dataset(&table()).unwrap();
        assert_eq!(dataset.n_features(), 5);
        assert_eq!(dataset.features[0][2], 1.0);
    }

    #[test]
    fn test_missing_target_column() {
        let engine = FeatureEngine::new(FeatureSpec {
            target: "tmdb_score".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            engine.build_dataset(&table()),
            Err(CatalogError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_text_column_as_numeric_feature() {
        let engine = FeatureEngine::new(FeatureSpec {
            numeric: vec!["title".to_string()],
            ..Default::default()
        });
        assert!(matches!(
            engine.build_dataset(&table()),
            Err(CatalogError::InvalidColumnType { .. })
        ));
    }

    #[test]
    fn test_no_features_present() {
        let engine = FeatureEngine::new(FeatureSpec {
            numeric: vec!["nope".to_string()],
            categorical: vec![],
            ..Default::default()
        });
        assert!(engine.build_dataset(&table()).is_err());
    }
}
