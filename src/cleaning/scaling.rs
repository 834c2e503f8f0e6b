//! Min-max scaling

use crate::data::Table;
use crate::error::Result;
use tracing::warn;

/// Observed range of a scaled column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

/// Rescale a numeric column to [0, 1] in place
///
/// Missing cells stay missing. A constant column becomes all zeros and a
/// column without observed values is left as-is (`Ok(None)`).
pub fn normalize_column(table: &mut Table, name: &str) -> Result<Option<ColumnRange>> {
    let values = table.column_mut(name)?.as_numeric_mut()?;

    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        warn!("Column '{}' has no observed values, skipping normalization", name);
        return Ok(None);
    }

    let span = max - min;
    if span == 0.0 {
        warn!("Column '{}' is constant ({}), scaling to 0", name, min);
    }

    for value in values.iter_mut().flatten() {
        *value = if span == 0.0 { 0.0 } else { (*value - min) / span };
    }

    Ok(Some(ColumnRange { min, max }))
}
