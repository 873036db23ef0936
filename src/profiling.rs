//! Dataset-level overview and per-column value frequencies.
//!
//! The overview is what a user sees right after loading a file: shape,
//! missing cells, duplicate rows and the kind of every column. Profiling
//! tolerates dirty data; missing values are expected input, not errors.
//!
//! # Example
//!
//! ```
//! use u_datalab::ingest::ingest;
//! use u_datalab::profiling::profile_dataset;
//!
//! let csv = "x,y\n1.0,A\n2.0,B\nNA,A\n1.0,A\n";
//! let df = ingest(csv.as_bytes(), "csv").unwrap();
//! let overview = profile_dataset(&df);
//!
//! assert_eq!(overview.row_count, 4);
//! assert_eq!(overview.missing_count, 1);
//! assert_eq!(overview.duplicate_rows, 1);
//! assert_eq!(overview.columns[1].name, "y");
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::cleaning::first_occurrences;
use crate::dataframe::{Column, ColumnKind, DataFrame};
use crate::error::Result;
use crate::value::Value;

// ── Dataset Overview ──────────────────────────────────────────────────

/// Shape, missing-value and kind summary of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    /// Number of rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Total null cells across all columns.
    pub missing_count: usize,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
    /// Per-column kind and null count, in column order.
    pub columns: Vec<ColumnOverview>,
}

/// One column's entry in a [`DatasetOverview`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnOverview {
    pub name: String,
    pub kind: ColumnKind,
    pub null_count: usize,
}

/// Builds the overview of `store`.
pub fn profile_dataset(store: &DataFrame) -> DatasetOverview {
    let row_count = store.row_count();
    DatasetOverview {
        row_count,
        column_count: store.column_count(),
        missing_count: store.total_null_count(),
        duplicate_rows: row_count - first_occurrences(store).len(),
        columns: store
            .iter()
            .map(|(name, col)| ColumnOverview {
                name: name.to_string(),
                kind: col.kind(),
                null_count: col.null_count(),
            })
            .collect(),
    }
}

// ── Value frequencies ─────────────────────────────────────────────────

/// Occurrences of each non-null value of `column`, most frequent first,
/// ties in ascending value order.
///
/// ```
/// use u_datalab::ingest::ingest;
/// use u_datalab::profiling::value_counts;
/// use u_datalab::value::Value;
///
/// let df = ingest(b"city\nParis\nLyon\n\nParis\n", "csv").unwrap();
/// let counts = value_counts(&df, "city").unwrap();
/// assert_eq!(counts, vec![(Value::from("Paris"), 2), (Value::from("Lyon"), 1)]);
/// ```
pub fn value_counts(store: &DataFrame, column: &str) -> Result<Vec<(Value, usize)>> {
    let (_, col) = store.require_column(column)?;
    Ok(value_frequencies(col))
}

pub(crate) fn value_frequencies(col: &Column) -> Vec<(Value, usize)> {
    let mut counts: HashMap<Value, usize> = HashMap::new();
    for v in col.valid_values() {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut sorted: Vec<(Value, usize)> = counts.into_iter().collect();
    sorted.sort_by(|(va, ca), (vb, cb)| cb.cmp(ca).then_with(|| va.cmp(vb)));
    sorted
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::from_rows(
            vec!["x".into(), "c".into(), "flag".into()],
            &[
                vec![Value::from(1.0), "a".into(), true.into()],
                vec![Value::Null, "b".into(), false.into()],
                vec![Value::from(1.0), "a".into(), true.into()],
                vec![Value::from(2.0), Value::Null, Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn overview_counts() {
        let overview = profile_dataset(&sample());
        assert_eq!(overview.row_count, 4);
        assert_eq!(overview.column_count, 3);
        assert_eq!(overview.missing_count, 3);
        assert_eq!(overview.duplicate_rows, 1);
    }

    #[test]
    fn overview_column_kinds() {
        let overview = profile_dataset(&sample());
        let kinds: Vec<ColumnKind> = overview.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Numeric, ColumnKind::Categorical, ColumnKind::Other]
        );
        assert_eq!(overview.columns[0].null_count, 1);
    }

    #[test]
    fn overview_serializes_kind_names() {
        let json = serde_json::to_value(profile_dataset(&sample())).unwrap();
        assert_eq!(json["columns"][1]["kind"], serde_json::json!("categorical"));
    }

    #[test]
    fn empty_dataset() {
        let overview = profile_dataset(&DataFrame::new());
        assert_eq!(overview.row_count, 0);
        assert_eq!(overview.duplicate_rows, 0);
        assert!(overview.columns.is_empty());
    }

    #[test]
    fn value_counts_order_and_nulls() {
        let counts = value_counts(&sample(), "c").unwrap();
        assert_eq!(counts, vec![(Value::from("a"), 2), (Value::from("b"), 1)]);

        let counts = value_counts(&sample(), "x").unwrap();
        assert_eq!(counts, vec![(Value::from(1.0), 2), (Value::from(2.0), 1)]);
    }

    #[test]
    fn value_counts_ties_ascending() {
        let df = DataFrame::from_rows(
            vec!["k".into()],
            &[vec!["z".into()], vec!["m".into()], vec!["a".into()]],
        )
        .unwrap();
        let keys: Vec<Value> = value_counts(&df, "k").unwrap().into_iter().map(|(v, _)| v).collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("m"), Value::from("z")]);
    }

    #[test]
    fn value_counts_unknown_column() {
        assert!(value_counts(&sample(), "nope").is_err());
    }
}
