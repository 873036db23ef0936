//! Cleaning stages: duplicate-row removal and missing-value imputation.
//!
//! Every function borrows its input and returns a new [`DataFrame`]; a
//! failing call returns an error and produces nothing.
//!
//! # Example
//!
//! ```
//! use u_datalab::cleaning::{deduplicate, impute, MissingPolicy};
//! use u_datalab::ingest::ingest;
//!
//! let df = ingest(b"x\n1\n2\nNA\n4\n4\n", "csv").unwrap();
//! let (df, removed) = deduplicate(&df);
//! assert_eq!(removed, 1);
//!
//! let filled = impute(&df, "x", MissingPolicy::FillMean).unwrap();
//! let x = filled.column(0).unwrap().as_numeric().unwrap();
//! assert!((x[2] - 7.0 / 3.0).abs() < 1e-12);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::dataframe::{Column, ColumnKind, DataFrame};
use crate::error::{DataLabError, Result};
use crate::profiling::value_frequencies;
use crate::statistics::quantile_sorted;
use crate::value::Value;

// ── MissingPolicy ─────────────────────────────────────────────────────

/// How missing values in a column are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Leave the column as is.
    Keep,
    /// Drop every row where the column is null.
    DropRows,
    /// Replace nulls with the mean of the non-null values. Numeric only.
    FillMean,
    /// Replace nulls with the median of the non-null values. Numeric only.
    FillMedian,
    /// Replace nulls with the most frequent non-null value.
    FillMode,
}

/// Derives the replacement value for a column's nulls, or `None` when the
/// column has no non-null values to derive it from.
type FillStrategy = fn(&Column) -> Option<Value>;

impl MissingPolicy {
    /// Every policy, in the order a selector lists them.
    pub const ALL: [Self; 5] = [
        Self::Keep,
        Self::DropRows,
        Self::FillMean,
        Self::FillMedian,
        Self::FillMode,
    ];

    /// Returns the kebab-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::DropRows => "drop-rows",
            Self::FillMean => "fill-mean",
            Self::FillMedian => "fill-median",
            Self::FillMode => "fill-mode",
        }
    }

    fn fill_strategy(&self) -> Option<FillStrategy> {
        match self {
            Self::FillMean => Some(mean_fill),
            Self::FillMedian => Some(median_fill),
            Self::FillMode => Some(mode_fill),
            Self::Keep | Self::DropRows => None,
        }
    }

    fn requires_numeric(&self) -> bool {
        matches!(self, Self::FillMean | Self::FillMedian)
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown missing-value policy '{s}'"))
    }
}

/// A policy bound to a column, one entry of a cleaning plan.
///
/// ```
/// use u_datalab::cleaning::{ColumnPolicy, MissingPolicy};
///
/// let plan: Vec<ColumnPolicy> =
///     serde_json::from_str(r#"[{"column": "sales", "policy": "fill-median"}]"#).unwrap();
/// assert_eq!(plan[0].policy, MissingPolicy::FillMedian);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPolicy {
    pub column: String,
    pub policy: MissingPolicy,
}

impl ColumnPolicy {
    pub fn new(column: impl Into<String>, policy: MissingPolicy) -> Self {
        Self {
            column: column.into(),
            policy,
        }
    }
}

// ── Deduplication ─────────────────────────────────────────────────────

/// Removes exact duplicate rows, keeping the first occurrence of each.
///
/// Null positions take part in the comparison, so two rows that are null
/// in the same columns and equal elsewhere are duplicates. Returns the new
/// frame and the number of rows removed.
pub fn deduplicate(store: &DataFrame) -> (DataFrame, usize) {
    let keep = first_occurrences(store);
    let deduped = store.take_rows(&keep);
    let removed = store.row_count() - deduped.row_count();
    debug!(
        rows_in = store.row_count(),
        rows_out = deduped.row_count(),
        removed,
        "deduplicated"
    );
    (deduped, removed)
}

/// Indices of the first occurrence of each distinct row, in order.
pub(crate) fn first_occurrences(store: &DataFrame) -> Vec<usize> {
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(store.row_count());
    (0..store.row_count())
        .filter(|&i| seen.insert(store.row(i)))
        .collect()
}

// ── Imputation ────────────────────────────────────────────────────────

/// Applies `policy` to `column`.
///
/// Only `column` changes; [`DropRows`](MissingPolicy::DropRows) removes
/// whole rows but rewrites no other cell, and every column keeps its
/// kind. A fill rebuilds `column` from its filled values. When there is
/// nothing to fill the input comes back unchanged.
///
/// # Errors
///
/// - [`EmptySelection`](DataLabError::EmptySelection) if `column` is empty
/// - [`ColumnNotFound`](DataLabError::ColumnNotFound) if `column` does not exist
/// - [`InvalidPolicyForKind`](DataLabError::InvalidPolicyForKind) for a mean
///   or median fill on a non-numeric column
pub fn impute(store: &DataFrame, column: &str, policy: MissingPolicy) -> Result<DataFrame> {
    let (index, col) = store.require_column(column)?;

    if policy.requires_numeric() && col.kind() != ColumnKind::Numeric {
        return Err(DataLabError::InvalidPolicyForKind {
            column: column.to_string(),
            policy: policy.to_string(),
            kind: col.kind().to_string(),
        });
    }

    let result = match policy {
        MissingPolicy::Keep => store.clone(),
        MissingPolicy::DropRows => {
            let keep: Vec<usize> = col.validity().valid_indices().collect();
            if keep.len() == store.row_count() {
                store.clone()
            } else {
                store.take_rows(&keep)
            }
        }
        MissingPolicy::FillMean | MissingPolicy::FillMedian | MissingPolicy::FillMode => {
            match policy.fill_strategy().and_then(|fill| fill_nulls(col, fill)) {
                Some(filled) => store.with_column_at(index, filled)?,
                None => store.clone(),
            }
        }
    };

    debug!(
        column,
        %policy,
        rows_in = store.row_count(),
        rows_out = result.row_count(),
        "imputed"
    );
    Ok(result)
}

/// Applies each entry of `plan` in order.
///
/// All-or-nothing: the first failing entry aborts the plan and no partial
/// result is returned.
pub fn clean(store: &DataFrame, plan: &[ColumnPolicy]) -> Result<DataFrame> {
    plan.iter().try_fold(store.clone(), |df, entry| {
        impute(&df, &entry.column, entry.policy)
    })
}

/// Names of columns holding at least one null, in column order.
pub fn missing_columns(store: &DataFrame) -> Vec<&str> {
    store
        .iter()
        .filter(|(_, col)| col.null_count() > 0)
        .map(|(name, _)| name)
        .collect()
}

/// Builds the filled column, or `None` when nothing changes.
fn fill_nulls(col: &Column, fill: FillStrategy) -> Option<Column> {
    if col.null_count() == 0 {
        return None;
    }
    let replacement = fill(col)?;
    let values: Vec<Value> = col
        .values()
        .into_iter()
        .map(|v| if v.is_null() { replacement.clone() } else { v })
        .collect();
    Some(Column::from_values(&values))
}

// ── Fill strategies ───────────────────────────────────────────────────

fn mean_fill(col: &Column) -> Option<Value> {
    let values = col.valid_numeric_values().filter(|v| !v.is_empty())?;
    Some(Value::Number(values.iter().mean()))
}

fn median_fill(col: &Column) -> Option<Value> {
    let mut values = col.valid_numeric_values().filter(|v| !v.is_empty())?;
    values.sort_by(f64::total_cmp);
    Some(Value::Number(quantile_sorted(&values, 0.5)))
}

/// Most frequent non-null value; ties go to the smallest value.
fn mode_fill(col: &Column) -> Option<Value> {
    value_frequencies(col).into_iter().next().map(|(v, _)| v)
}

// ── Tests ─────────────────────────────────────────────────────────────
