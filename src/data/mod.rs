//! Data structures module
//!
//! `Table` holds raw and cleaned catalog rows; `Dataset` is the numeric
//! matrix the models train on.

mod dataset;
mod table;

pub use dataset::{Dataset, Split};
pub use table::{Column, ColumnData, Table};
