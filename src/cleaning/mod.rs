//! Data cleaning module
//!
//! Turns the raw catalog table into the processed one: missing numeric
//! values are imputed, exact duplicate rows dropped, and selected columns
//! min-max scaled, in that order.

mod impute;
mod scaling;

pub use impute::{fill_missing_values, FillSummary, ImputeStrategy};
pub use scaling::{normalize_column, ColumnRange};

use crate::config::CleaningConfig;
use crate::data::Table;
use crate::error::Result;
use std::collections::HashSet;
use tracing::info;

/// Drop rows equal in every column, keeping the first occurrence
///
/// Missing cells compare equal to each other. Returns the number of rows removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let keep: Vec<usize> = {
        let keys = table.row_keys();
        let mut seen = HashSet::with_capacity(keys.len());
        keys.into_iter()
            .enumerate()
            .filter_map(|(i, key)| seen.insert(key).then_some(i))
            .collect()
    };

    let removed = table.n_rows() - keep.len();
    if removed > 0 {
        *table = table.take_rows(&keep);
    }
    removed
}

/// Missing cells in one column
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSummary {
    pub column: String,
    pub missing: usize,
    /// Share of rows missing, in percent
    pub percentage: f64,
}

/// Count of missing values per column
pub fn missing_report(table: &Table) -> Vec<MissingSummary> {
    let n = table.n_rows();
    table
        .columns()
        .iter()
        .map(|c| {
            let missing = c.data.missing_count();
            MissingSummary {
                column: c.name.clone(),
                missing,
                percentage: if n == 0 {
                    0.0
                } else {
                    missing as f64 / n as f64 * 100.0
                },
            }
        })
        .collect()
}

/// What a cleaning run changed
#[derive(Debug, Clone)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub fills: Vec<FillSummary>,
    pub duplicates_removed: usize,
    pub normalized: Vec<(String, Option<ColumnRange>)>,
}

impl CleaningReport {
    pub fn cells_filled(&self) -> usize {
        self.fills.iter().map(|f| f.filled).sum()
    }
}

/// Run the full cleaning sequence on `table`
pub fn clean(table: &mut Table, config: &CleaningConfig) -> Result<CleaningReport> {
    let rows_in = table.n_rows();

    let fills = fill_missing_values(table, config.strategy);

    let duplicates_removed = if config.remove_duplicates {
        remove_duplicates(table)
    } else {
        0
    };

    let mut normalized = Vec::with_capacity(config.normalize_columns.len());
    for name in &config.normalize_columns {
        let range = normalize_column(table, name)?;
        normalized.push((name.clone(), range));
    }

    let report = CleaningReport {
        rows_in,
        rows_out: table.n_rows(),
        fills,
        duplicates_removed,
        normalized,
    };

    info!(
        "Cleaned table: {} -> {} rows, {} cells filled ({}), {} duplicates removed",
        report.rows_in,
        report.rows_out,
        report.cells_filled(),
        config.strategy,
        report.duplicates_removed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn raw() -> Table {
        Table::new(vec![
            Column::text(
                "title",
                vec![
                    Some("Dark".into()),
                    Some("Roma".into()),
                    Some("Dark".into()),
                    None,
                    None,
                ],
            ),
            Column::numeric("seasons", vec![Some(3.0), None, Some(3.0), Some(1.0), Some(1.0)]),
            Column::numeric(
                "imdb_votes",
                vec![Some(100.0), Some(300.0), Some(100.0), Some(200.0), Some(200.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let mut table = raw();
        let removed = remove_duplicates(&mut table);
        assert_eq!(removed, 2);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.column("imdb_votes").unwrap().as_numeric().unwrap(),
            &[Some(100.0), Some(300.0), Some(200.0)]
        );
    }

    #[test]
    fn test_remove_duplicates_none() {
        let mut table = Table::new(vec![Column::numeric("x", vec![Some(1.0), Some(2.0)])]).unwrap();
        assert_eq!(remove_duplicates(&mut table), 0);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn test_remove_duplicates_signed_zero_and_missing() {
        let mut table = Table::new(vec![Column::numeric(
            "x",
            vec![Some(-0.0), Some(0.0), None, None],
        )])
        .unwrap();
        assert_eq!(remove_duplicates(&mut table), 2);
        assert_eq!(
            table.column("x").unwrap().as_numeric().unwrap(),
            &[Some(-0.0), None]
        );
    }

    #[test]
    fn test_missing_report() {
        let report = missing_report(&raw());
        assert_eq!(report[0].missing, 2);
        assert_eq!(report[0].percentage, 40.0);
        assert_eq!(report[1].missing, 1);
        assert_eq!(report[2].missing, 0);

        let empty = missing_report(&Table::new(vec![Column::numeric("x", vec![])]).unwrap());
        assert_eq!(empty[0].percentage, 0.0);
    }

    #[test]
    fn test_clean_runs_all_steps() {
        let mut table = raw();
        let config = CleaningConfig {
            strategy: ImputeStrategy::Median,
            remove_duplicates: true,
            normalize_columns: vec!["imdb_votes".to_string()],
        };

        let report = clean(&mut table, &config).unwrap();

        assert_eq!(report.rows_in, 5);
        assert_eq!(report.rows_out, 3);
        assert_eq!(report.cells_filled(), 1);
        assert_eq!(report.duplicates_removed, 2);

        // median of [3, 3, 1, 1] fills Roma's seasons
        let seasons = table.column("seasons").unwrap().as_numeric().unwrap();
        assert_eq!(seasons, &[Some(3.0), Some(2.0), Some(1.0)]);

        let votes = table.column("imdb_votes").unwrap().as_numeric().unwrap();
        assert_eq!(votes, &[Some(0.0), Some(1.0), Some(0.5)]);
    }

    #[test]
    fn test_clean_unknown_normalize_column() {
        let mut table = raw();
        let config = CleaningConfig {
            normalize_columns: vec!["nope".to_string()],
            ..Default::default()
        };
        assert!(clean(&mut table, &config).is_err());
    }
}
