// ## 📂 File: `src/source/types.rs`

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One spreadsheet cell after reading. Closed set: every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell, error cell (`#N/A`, `#DIV/0!`), NaN, or a padded short row.
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        if f.is_nan() {
            CellValue::Missing
        } else {
            CellValue::Float(f)
        }
    }
}

/// Declared column type used by schema profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Timestamp,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Worksheet contents: header-row column names plus positional rows.
///
/// Every row has exactly `columns.len()` cells. Column names are raw
/// (unsanitized) and may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularSource {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based worksheet row of each entry in `rows`. Empty means rows are
    /// contiguous directly under a header in row 1.
    pub source_rows: Vec<usize>,
}

impl TabularSource {
    /// Build from raw rows, padding short rows with `Missing` and
    /// truncating overlong ones to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Missing);
                row
            })
            .collect();
        Self { columns, rows, source_rows: Vec::new() }
    }

    /// Attach the worksheet row number of every data row.
    pub fn with_source_rows(mut self, source_rows: Vec<usize>) -> Self {
        debug_assert_eq!(source_rows.len(), self.rows.len());
        self.source_rows = source_rows;
        self
    }

    /// 1-based worksheet row that data row `index` was read from.
    pub fn source_row(&self, index: usize) -> usize {
        self.source_rows.get(index).copied().unwrap_or(index + 2)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Build from `(column, value)` records. Columns are ordered by first
    /// appearance; absent keys become `Missing`.
    pub fn from_records<K, I, R>(records: I) -> Self
    where
        K: AsRef<str>,
        R: IntoIterator<Item = (K, CellValue)>,
        I: IntoIterator<Item = R>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut keyed: Vec<Vec<(usize, CellValue)>> = Vec::new();

        for record in records {
            let mut cells = Vec::new();
            for (key, value) in record {
                let key = key.as_ref();
                let idx = match columns.iter().position(|c| c == key) {
                    Some(i) => i,
                    None => {
                        columns.push(key.to_string());
                        columns.len() - 1
                    }
                };
                cells.push((idx, value));
            }
            keyed.push(cells);
        }

        let width = columns.len();
        let rows = keyed
            .into_iter()
            .map(|cells| {
                let mut row = vec![CellValue::Missing; width];
                for (idx, value) in cells {
                    row[idx] = value;
                }
                row
            })
            .collect();

        Self { columns, rows, source_rows: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded() {
        let src = TabularSource::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![CellValue::Integer(1)], vec![]],
        );
        assert_eq!(src.rows[0], vec![CellValue::Integer(1), CellValue::Missing, CellValue::Missing]);
        assert_eq!(src.rows[1].len(), 3);
    }

    #[test]
    fn records_fill_absent_keys_with_missing() {
        let src = TabularSource::from_records(vec![
            vec![("Name", CellValue::from("Jo"))],
            vec![("Age", CellValue::Integer(3)), ("Name", CellValue::from("Al"))],
        ]);
        assert_eq!(src.columns, vec!["Name", "Age"]);
        assert_eq!(src.rows[0][1], CellValue::Missing);
        assert_eq!(src.rows[1][0], CellValue::from("Al"));
    }

    #[test]
    fn source_rows_default_to_contiguous_numbering() {
        let src = TabularSource::new(vec!["a".into()], vec![vec![], vec![]]);
        assert_eq!((src.source_row(0), src.source_row(1)), (2, 3));

        let src = src.with_source_rows(vec![4, 9]);
        assert_eq!((src.source_row(0), src.source_row(1)), (4, 9));
    }

    #[test]
    fn nan_float_is_missing() {
        assert!(CellValue::from(f64::NAN).is_missing());
    }
}
