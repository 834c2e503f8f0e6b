//! One-hot encoding of categorical columns

use crate::data::Column;
use std::collections::BTreeSet;

/// Fitted one-hot encoder for a single column
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Learn the sorted distinct values of `column`
    ///
    /// With `drop_first` the first category gets no indicator, so a row
    /// in that category encodes as all zeros.
    pub fn fit(column: &Column, drop_first: bool) -> Self {
        let distinct: BTreeSet<String> = (0..column.data.len())
            .filter_map(|row| column.data.render(row))
            .collect();

        let mut categories: Vec<String> = distinct.into_iter().collect();
        if drop_first && !categories.is_empty() {
            categories.remove(0);
        }

        Self {
            column: column.name.clone(),
            categories,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Indicator column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    /// Indicator values for one cell; missing or dropped values are all zeros
    pub fn encode(&self, value: Option<&str>) -> Vec<f64> {
        let mut out = vec![0.0; self.categories.len()];
        if let Some(value) = value {
            if let Ok(idx) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
                out[idx] = 1.0;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certification() -> Column {
        Column::text(
            "age_certification",
            vec![
                Some("TV-MA".into()),
                Some("PG".into()),
                None,
                Some("R".into()),
                Some("PG".into()),
            ],
        )
    }

    #[test]
    fn test_fit_sorted_categories() {
        let encoder = OneHotEncoder::fit(&certification(), false);
        assert_eq!(encoder.categories(), &["PG", "R", "TV-MA"]);
        assert_eq!(
            encoder.feature_names(),
            vec![
                "age_certification_PG",
                "age_certification_R",
                "age_certification_TV-MA"
            ]
        );
        assert_eq!(encoder.encode(Some("R")), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_drop_first() {
        let encoder = OneHotEncoder::fit(&certification(), true);
        assert_eq!(encoder.categories(), &["R", "TV-MA"]);
        assert_eq!(encoder.encode(Some("PG")), vec![0.0, 0.0]);
        assert_eq!(encoder.encode(Some("TV-MA")), vec![0.0, 1.0]);
        assert_eq!(encoder.encode(None), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unseen_value_encodes_as_zeros() {
        let encoder = OneHotEncoder::fit(&certification(), false);
        assert_eq!(encoder.encode(Some("NC-17")), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_numeric_column_categories() {
        let column = Column::numeric("seasons", vec![Some(2.0), Some(10.0), Some(2.0)]);
        let encoder = OneHotEncoder::fit(&column, false);
        // string ordering, as rendered
        assert_eq!(encoder.categories(), &["10", "2"]);
    }
}
