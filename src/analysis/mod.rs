//! Descriptive statistics over the processed catalog
//!
//! These feed the figures and the console summaries of `make_figures`.

use crate::data::{ColumnData, Table};
use crate::error::{CatalogError, Result};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Words ignored when counting description vocabulary
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "her", "was", "one",
    "our", "out", "his", "has", "had", "him", "how", "its", "who", "she", "they", "them", "their",
    "this", "that", "with", "from", "into", "when", "what", "where", "while", "which", "will",
    "your", "have", "been", "after", "about", "than", "then", "there", "these", "those", "over",
    "must", "more", "most", "only", "also", "just", "some", "such", "each", "other", "through",
    "between", "before", "during", "under", "again", "both", "very", "own", "same", "being",
    "were", "would", "could", "should", "upon", "onto", "off", "down", "now", "new", "get",
    "gets", "find", "finds", "takes", "make", "makes", "up", "as", "an", "at", "by", "in", "is",
    "it", "of", "on", "or", "to", "he", "we", "be", "so", "if", "no", "do", "a", "s",
];

/// Occurrences of each distinct value, most frequent first
///
/// Ties are ordered by value; missing cells are not counted.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(String, usize)>> {
    let data = &table.column(column)?.data;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in 0..data.len() {
        if let Some(value) = data.render(row) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

/// Catalog size and average score for one release year
#[derive(Debug, Clone, PartialEq)]
pub struct YearStat {
    pub year: i64,
    pub count: usize,
    /// Mean over titles that have a score
    pub mean_score: Option<f64>,
}

/// Titles per year and their mean score, ascending by year
pub fn yearly_trend(table: &Table, year_col: &str, score_col: &str) -> Result<Vec<YearStat>> {
    let years = table.column(year_col)?.as_numeric()?;
    let scores = table.column(score_col)?.as_numeric()?;

    let mut by_year: BTreeMap<i64, (usize, f64, usize)> = BTreeMap::new();
    for (year, score) in years.iter().zip(scores) {
        let Some(year) = year else { continue };
        let entry = by_year.entry(year.round() as i64).or_default();
        entry.0 += 1;
        if let Some(score) = score {
            entry.1 += score;
            entry.2 += 1;
        }
    }

    Ok(by_year
        .into_iter()
        .map(|(year, (count, sum, scored))| YearStat {
            year,
            count,
            mean_score: (scored > 0).then(|| sum / scored as f64),
        })
        .collect())
}

/// Values of `value_col` grouped by `group_col`, groups sorted by name
pub fn group_values(
    table: &Table,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let groups = &table.column(group_col)?.data;
    let values = table.column(value_col)?.as_numeric()?;

    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (row, value) in values.iter().enumerate() {
        if let (Some(group), Some(value)) = (groups.render(row), value) {
            grouped.entry(group).or_default().push(*value);
        }
    }
    Ok(grouped.into_iter().collect())
}

/// Pairwise Pearson correlations between numeric columns
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Symmetric, NaN where a pair has fewer than two complete rows or no variance
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[[i, j]])
    }
}

/// Pearson correlation of all numeric columns, using pairwise-complete rows
pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
    let names: Vec<String> = table
        .numeric_column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let columns: Vec<&[Option<f64>]> = names
        .iter()
        .map(|n| table.column(n)?.as_numeric())
        .collect::<Result<_>>()?;

    let k = names.len();
    let mut values = Array2::from_elem((k, k), f64::NAN);
    for i in 0..k {
        for j in i..k {
            let r = pearson(columns[i], columns[j]);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    Ok(CorrelationMatrix { names, values })
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Most frequent description words, most frequent first
///
/// Tokens are lowercase alphabetic runs of at least three letters that
/// are not stop words. Ties are ordered alphabetically.
pub fn word_frequencies<'a, I>(texts: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        for token in text.split(|c: char| !c.is_alphabetic()) {
            if token.chars().count() < 3 {
                continue;
            }
            let word = token.to_lowercase();
            if stop.contains(word.as_str()) {
                continue;
            }
            *counts.entry(word).or_default() += 1;
        }
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(top_n);
    counts
}

/// Non-missing cells of a text column
pub fn text_values<'a>(table: &'a Table, column: &str) -> Result<Vec<&'a str>> {
    match &table.column(column)?.data {
        ColumnData::Text(values) => Ok(values.iter().flatten().map(String::as_str).collect()),
        other => Err(CatalogError::InvalidColumnType {
            column: column.to_string(),
            expected: "text",
            actual: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    fn catalog() -> Table {
        Table::new(vec![
            Column::text(
                "type",
                vec![
                    Some("MOVIE".into()),
                    Some("SHOW".into()),
                    Some("MOVIE".into()),
                    None,
                    Some("SHOW".into()),
                    Some("MOVIE".into()),
                ],
            ),
            Column::numeric(
                "release_year",
                vec![Some(2019.0), Some(2020.0), Some(2019.0), Some(2021.0), Some(2020.0), None],
            ),
            Column::numeric(
                "imdb_score",
                vec![Some(6.0), Some(8.0), Some(7.0), None, Some(9.0), Some(5.0)],
            ),
            Column::numeric(
                "imdb_votes",
                vec![Some(60.0), Some(80.0), Some(70.0), Some(10.0), Some(90.0), Some(50.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_value_counts() {
        let counts = value_counts(&catalog(), "type").unwrap();
        assert_eq!(
            counts,
            vec![("MOVIE".to_string(), 3), ("SHOW".to_string(), 2)]
        );
        assert!(value_counts(&catalog(), "nope").is_err());
    }

    #[test]
    fn test_yearly_trend() {
        let trend = yearly_trend(&catalog(), "release_year", "imdb_score").unwrap();
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0], YearStat { year: 2019, count: 2, mean_score: Some(6.5) });
        assert_eq!(trend[1], YearStat { year: 2020, count: 2, mean_score: Some(8.5) });
        assert_eq!(trend[2], YearStat { year: 2021, count: 1, mean_score: None });
    }

    #[test]
    fn test_group_values() {
        let groups = group_values(&catalog(), "type", "imdb_score").unwrap();
        assert_eq!(groups[0], ("MOVIE".to_string(), vec![6.0, 7.0, 5.0]));
        assert_eq!(groups[1], ("SHOW".to_string(), vec![8.0, 9.0]));
    }

    #[test]
    fn test_correlation_matrix() {
        let corr = correlation_matrix(&catalog()).unwrap();
        assert_eq!(corr.names, vec!["release_year", "imdb_score", "imdb_votes"]);
        assert_relative_eq!(corr.get("imdb_score", "imdb_score").unwrap(), 1.0);

        // votes = 10 * score on every row with both present
        assert_relative_eq!(corr.get("imdb_score", "imdb_votes").unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(
            corr.get("imdb_votes", "imdb_score"),
            corr.get("imdb_score", "imdb_votes")
        );
    }

    #[test]
    fn test_correlation_of_constant_is_nan() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(1.0), Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let corr = correlation_matrix(&table).unwrap();
        assert!(corr.get("a", "b").unwrap().is_nan());
    }

    #[test]
    fn test_word_frequencies() {
        let texts = [
            "A detective hunts a killer in Berlin.",
            "The killer returns; the detective retires.",
            "An ex-detective in Berlin, of all places",
        ];
        let words = word_frequencies(texts, 3);
        assert_eq!(
            words,
            vec![
                ("detective".to_string(), 3),
                ("berlin".to_string(), 2),
                ("killer".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_text_values() {
        let table = catalog();
        assert_eq!(text_values(&table, "type").unwrap().len(), 5);
        assert!(text_values(&table, "imdb_score").is_err());
    }
}
