//! Row restriction by allowed value sets.
//!
//! Restriction keeps column kinds as they are, so applying several
//! restrictions one after another gives the same frame in any order.
//!
//! ```
//! use std::collections::HashSet;
//! use u_datalab::filter::restrict;
//! use u_datalab::ingest::ingest;
//! use u_datalab::value::Value;
//!
//! let df = ingest(b"region,sales\nA,10\nB,5\nA,3\n", "csv").unwrap();
//! let allowed: HashSet<Value> = [Value::from("A")].into_iter().collect();
//! let only_a = restrict(&df, "region", &allowed).unwrap();
//! assert_eq!(only_a.row_count(), 2);
//! ```

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataframe::{Column, DataFrame};
use crate::error::Result;
use crate::value::Value;

/// An allowed-value predicate on one column.
///
/// `Value::Null` in `allowed` matches null cells. An empty set matches
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub allowed: HashSet<Value>,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, allowed: impl IntoIterator<Item = Value>) -> Self {
        Self {
            column: column.into(),
            allowed: allowed.into_iter().collect(),
        }
    }
}

/// Keeps the rows whose value in `column` is in `allowed`.
pub fn restrict(store: &DataFrame, column: &str, allowed: &HashSet<Value>) -> Result<DataFrame> {
    let (_, col) = store.require_column(column)?;
    let keep: Vec<usize> = (0..store.row_count())
        .filter(|&i| matches(col, i, allowed))
        .collect();
    debug!(
        column,
        allowed = allowed.len(),
        rows_in = store.row_count(),
        rows_out = keep.len(),
        "restricted"
    );
    Ok(store.take_rows(&keep))
}

/// Keeps the rows matching every filter.
///
/// All filters are checked against `store` before any row is selected,
/// so an unknown column fails the whole call. No filters keeps every row.
pub fn restrict_all(store: &DataFrame, filters: &[ColumnFilter]) -> Result<DataFrame> {
    let predicates = filters
        .iter()
        .map(|f| store.require_column(&f.column).map(|(_, col)| (col, &f.allowed)))
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<usize> = (0..store.row_count())
        .filter(|&i| predicates.iter().all(|(col, allowed)| matches(col, i, allowed)))
        .collect();
    debug!(
        filters = filters.len(),
        rows_in = store.row_count(),
        rows_out = keep.len(),
        "restricted on all filters"
    );
    Ok(store.take_rows(&keep))
}

/// Distinct values of `column` in ascending order, null last if present.
pub fn distinct_values(store: &DataFrame, column: &str) -> Result<Vec<Value>> {
    let (_, col) = store.require_column(column)?;
    let distinct: BTreeSet<Value> = col.values().into_iter().collect();
    Ok(distinct.into_iter().collect())
}

fn matches(col: &Column, row: usize, allowed: &HashSet<Value>) -> bool {
    allowed.contains(&col.value_at(row))
}

// ── Tests ─────────────────────────────────────────────────────────────
