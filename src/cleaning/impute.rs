//! Missing-value imputation for numeric columns

use crate::data::Table;
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How missing numeric cells are filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImputeStrategy {
    /// Arithmetic mean of the observed values
    #[default]
    Mean,
    /// Middle observed value (mean of the two middle values for even counts)
    Median,
    /// Most frequent observed value, smallest on ties
    Mode,
    /// A fixed value
    Constant(f64),
}

impl FromStr for ImputeStrategy {
    type Err = CatalogError;

    /// Accepts `mean`, `median`, `mode`, `constant`/`zero` (fill 0) or a number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(ImputeStrategy::Mean),
            "median" => Ok(ImputeStrategy::Median),
            "mode" | "most_frequent" => Ok(ImputeStrategy::Mode),
            "constant" | "zero" => Ok(ImputeStrategy::Constant(0.0)),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ImputeStrategy::Constant)
                .ok_or_else(|| CatalogError::Config(format!("unknown imputation strategy '{s}'"))),
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::Mean => write!(f, "mean"),
            ImputeStrategy::Median => write!(f, "median"),
            ImputeStrategy::Mode => write!(f, "mode"),
            ImputeStrategy::Constant(v) if *v == 0.0 => write!(f, "constant"),
            ImputeStrategy::Constant(v) => write!(f, "{v}"),
        }
    }
}

impl TryFrom<String> for ImputeStrategy {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImputeStrategy> for String {
    fn from(value: ImputeStrategy) -> Self {
        value.to_string()
    }
}

impl ImputeStrategy {
    /// Fill value for a column, `None` when no statistic exists
    pub fn fill_value(&self, values: &[Option<f64>]) -> Option<f64> {
        let mut observed: Vec<f64> = values.iter().flatten().copied().collect();

        match self {
            ImputeStrategy::Constant(v) => Some(*v),
            _ if observed.is_empty() => None,
            ImputeStrategy::Mean => Some(observed.iter().sum::<f64>() / observed.len() as f64),
            ImputeStrategy::Median => {
                observed.sort_by(f64::total_cmp);
                let mid = observed.len() / 2;
                if observed.len() % 2 == 0 {
                    Some((observed[mid - 1] + observed[mid]) / 2.0)
                } else {
                    Some(observed[mid])
                }
            }
            ImputeStrategy::Mode => {
                observed.sort_by(f64::total_cmp);
                let mut best = observed[0];
                let mut best_count = 0;
                let mut i = 0;
                while i < observed.len() {
                    let mut j = i;
                    while j < observed.len() && observed[j] == observed[i] {
                        j += 1;
                    }
                    // Strictly greater keeps the smallest value on ties
                    if j - i > best_count {
                        best_count = j - i;
                        best = observed[i];
                    }
                    i = j;
                }
                Some(best)
            }
        }
    }
}

/// Outcome of filling one column
#[derive(Debug, Clone, PartialEq)]
pub struct FillSummary {
    pub column: String,
    /// Value used, `None` when the column had nothing to compute it from
    pub value: Option<f64>,
    /// Number of cells filled
    pub filled: usize,
}

/// Fill missing cells of every numeric column; text columns are untouched
pub fn fill_missing_values(table: &mut Table, strategy: ImputeStrategy) -> Vec<FillSummary> {
    let mut summaries = Vec::new();

    for column in table.columns_mut() {
        let name = column.name.clone();
        let Ok(values) = column.as_numeric_mut() else {
            continue;
        };

        let missing = values.iter().filter(|v| v.is_none()).count();
        let value = strategy.fill_value(values);

        let filled = match value {
            Some(fill) if missing > 0 => {
                for cell in values.iter_mut().filter(|v| v.is_none()) {
                    *cell = Some(fill);
                }
                debug!("Filled {} cells of '{}' with {:.4}", missing, name, fill);
                missing
            }
            None if missing > 0 => {
                warn!(
                    "Column '{}' has no observed values; {} strategy leaves it unfilled",
                    name, strategy
                );
                0
            }
            _ => 0,
        };

        summaries.push(FillSummary {
            column: name,
            value,
            filled,
        });
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    fn table() -> Table {
        Table::new(vec![
            Column::numeric("a", vec![Some(1.0), None, Some(3.0), Some(3.0), Some(8.0)]),
            Column::text("t", vec![None, Some("x".into()), None, None, None]),
            Column::numeric("empty", vec![None; 5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_strategies() {
        assert_eq!("mean".parse::<ImputeStrategy>().unwrap(), ImputeStrategy::Mean);
        assert_eq!("Median".parse::<ImputeStrategy>().unwrap(), ImputeStrategy::Median);
        assert_eq!("mode".parse::<ImputeStrategy>().unwrap(), ImputeStrategy::Mode);
        assert_eq!(
            "zero".parse::<ImputeStrategy>().unwrap(),
            ImputeStrategy::Constant(0.0)
        );
        assert_eq!(
            "-1.5".parse::<ImputeStrategy>().unwrap(),
            ImputeStrategy::Constant(-1.5)
        );
        assert!("average".parse::<ImputeStrategy>().is_err());
    }

    #[test]
    fn test_fill_values() {
        let values = [Some(1.0), None, Some(3.0), Some(3.0), Some(8.0)];
        assert_relative_eq!(ImputeStrategy::Mean.fill_value(&values).unwrap(), 3.75);
        assert_relative_eq!(ImputeStrategy::Median.fill_value(&values).unwrap(), 3.0);
        assert_relative_eq!(ImputeStrategy::Mode.fill_value(&values).unwrap(), 3.0);

        let even = [Some(4.0), Some(1.0), Some(2.0), Some(10.0)];
        assert_relative_eq!(ImputeStrategy::Median.fill_value(&even).unwrap(), 3.0);

        // every value appears once: smallest wins
        assert_relative_eq!(ImputeStrategy::Mode.fill_value(&even).unwrap(), 1.0);
    }

    #[test]
    fn test_fill_value_without_observations() {
        let values = [None, None];
        assert_eq!(ImputeStrategy::default(), ImputeStrategy::Mean);
        assert_eq!(ImputeStrategy::Mean.fill_value(&values), None);
        assert_eq!(ImputeStrategy::Median.fill_value(&values), None);
        assert_eq!(ImputeStrategy::Mode.fill_value(&[]), None);
        assert_eq!(ImputeStrategy::Constant(-2.0).fill_value(&values), Some(-2.0));
    }

    #[test]
    fn test_fill_missing_mean() {
        let mut table = table();
        let summaries = fill_missing_values(&mut table, ImputeStrategy::Mean);

        let a = table.column("a").unwrap().as_numeric().unwrap();
        assert_eq!(a[1], Some(3.75));
        assert_eq!(summaries[0].filled, 1);

        // text untouched, all-missing column left alone
        assert_eq!(table.column("t").unwrap().data.missing_count(), 4);
        assert_eq!(table.column("empty").unwrap().data.missing_count(), 5);
        assert_eq!(summaries[1].column, "empty");
        assert_eq!(summaries[1].value, None);
        assert_eq!(summaries[1].filled, 0);
    }

    #[test]
    fn test_constant_fills_empty_column() {
        let mut table = table();
        fill_missing_values(&mut table, ImputeStrategy::Constant(0.0));
        assert_eq!(
            table.column("empty").unwrap().as_numeric().unwrap(),
            &[Some(0.0); 5]
        );
    }

    #[test]
    fn test_strategy_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            strategy: ImputeStrategy,
        }

        let parsed: Wrapper = toml::from_str("strategy = \"median\"").unwrap();
        assert_eq!(parsed.strategy, ImputeStrategy::Median);

        let out = toml::to_string(&Wrapper {
            strategy: ImputeStrategy::Constant(2.5),
        })
        .unwrap();
        assert_eq!(out.trim(), "strategy = \"2.5\"");
    }
}
