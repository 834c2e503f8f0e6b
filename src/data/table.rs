//! Column-oriented table for raw and processed catalog data

use crate::error::{CatalogError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Cell tokens read as missing values
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Text(_) => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Render a cell the way it is written to CSV (`None` when missing)
    pub fn render(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Numeric(v) => v[row].map(|x| x.to_string()),
            ColumnData::Text(v) => v[row].clone(),
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => {
                ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// Named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Borrow numeric values, failing for text columns
    pub fn as_numeric(&self) -> Result<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Ok(v),
            other => Err(CatalogError::InvalidColumnType {
                column: self.name.clone(),
                expected: "numeric",
                actual: other.kind(),
            }),
        }
    }

    pub fn as_numeric_mut(&mut self) -> Result<&mut Vec<Option<f64>>> {
        match &mut self.data {
            ColumnData::Numeric(v) => Ok(v),
            other => Err(CatalogError::InvalidColumnType {
                column: self.name.clone(),
                expected: "numeric",
                actual: other.kind(),
            }),
        }
    }
}

/// Hashable view of one cell, used for duplicate detection
#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

/// Tabular dataset: equally long, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, validating lengths and names
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.data.len();
            for column in &columns {
                if column.data.len() != n {
                    return Err(CatalogError::ShapeMismatch {
                        expected: n,
                        actual: column.data.len(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CatalogError::invalid(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.data.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_string()))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_string()))
    }

    /// New table with the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(indices),
                })
                .collect(),
        }
    }

    /// Hash keys of every row, in row order
    pub(crate) fn row_keys(&self) -> Vec<Vec<CellKey<'_>>> {
        (0..self.n_rows())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| match &c.data {
                        ColumnData::Numeric(v) => match v[row] {
                            // -0.0 and 0.0 compare equal
                            Some(x) if x == 0.0 => CellKey::Number(0.0f64.to_bits()),
                            Some(x) => CellKey::Number(x.to_bits()),
                            None => CellKey::Missing,
                        },
                        ColumnData::Text(v) => match &v[row] {
                            Some(s) => CellKey::Text(s.as_str()),
                            None => CellKey::Missing,
                        },
                    })
                    .collect()
            })
            .collect()
    }

    /// Random subset of `n` rows without replacement
    ///
    /// Returns a copy of the table when it has at most `n` rows.
    pub fn sample(&self, n: usize, seed: u64) -> Table {
        if self.n_rows() <= n {
            return self.clone();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let indices = rand::seq::index::sample(&mut rng, self.n_rows(), n).into_vec();
        self.take_rows(&indices)
    }

    /// Load from a headered CSV file, inferring column types
    pub fn load_csv(path: &Path) -> Result<Self> {
        CatalogError::ensure_exists(path)?;
        let mut reader = csv::Reader::from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for result in reader.records() {
            let record = result?;
            for (j, cell) in record.iter().enumerate() {
                let value = if MISSING_TOKENS.contains(&cell.trim()) {
                    None
                } else {
                    Some(cell.to_string())
                };
                raw[j].push(value);
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| Column {
                name,
                data: infer_column(cells),
            })
            .collect();

        Table::new(columns)
    }

    /// Write to CSV, missing cells empty; parent directories are created
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(self.column_names())?;
        for row in 0..self.n_rows() {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.data.render(row).unwrap_or_default())
                .collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Numeric when every present cell parses as a finite-or-infinite float
fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.trim().parse::<f64>().ok().filter(|x| !x.is_nan()).map(Some),
        })
        .collect();

    match parsed {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Text(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_infers_types_and_missing() {
        let file = write_csv(
            "title,type,release_year,seasons,imdb_score\n\
             Dark,SHOW,2017,3,8.7\n\
             Roma,MOVIE,2018,,7.7\n\
             Okja,MOVIE,2017,NaN,\n",
        );
        let table = Table::load_csv(file.path()).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 5);
        assert_eq!(
            table.numeric_column_names(),
            vec!["release_year", "seasons", "imdb_score"]
        );

        let seasons = table.column("seasons").unwrap().as_numeric().unwrap();
        assert_eq!(seasons, &[Some(3.0), None, None]);
        assert!(!table.column("type").unwrap().data.is_numeric());
    }

    #[test]
    fn test_missing_tokens() {
        let file = write_csv("x,label\nNA,a\nN/A,b\nnan,c\nnull,d\nNULL,e\nNone,f\n 3 ,g\n");
        let table = Table::load_csv(file.path()).unwrap();

        let x = table.column("x").unwrap().as_numeric().unwrap();
        assert_eq!(x, &[None, None, None, None, None, None, Some(3.0)]);
        assert_eq!(table.column("label").unwrap().data.missing_count(), 0);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let file = write_csv("a,a\n1,2\n");
        let err = Table::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let file = write_csv("a,b\n1,\n2,\n");
        let table = Table::load_csv(file.path()).unwrap();
        assert!(table.column("b").unwrap().data.is_numeric());
        assert_eq!(table.column("b").unwrap().data.missing_count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Table::load_csv(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::MissingInput(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let table = Table::new(vec![
            Column::text("title", vec![Some("A, B".to_string()), None]),
            Column::numeric("score", vec![Some(7.5), None]),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        table.save_csv(&path).unwrap();

        let loaded = Table::load_csv(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ]);
        assert!(matches!(result, Err(CatalogError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_sample() {
        let values: Vec<Option<f64>> = (0..50).map(|i| Some(i as f64)).collect();
        let table = Table::new(vec![Column::numeric("x", values)]).unwrap();

        let small = table.sample(10, 7);
        assert_eq!(small.n_rows(), 10);
        assert_eq!(small, table.sample(10, 7));

        let mut seen: Vec<f64> = small
            .column("x")
            .unwrap()
            .as_numeric()
            .unwrap()
            .iter()
            .flatten()
            .copied()
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 10);

        assert_eq!(table.sample(100, 7).n_rows(), 50);
    }
}
