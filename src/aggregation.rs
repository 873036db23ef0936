//! Group-by aggregation of one numeric column.
//!
//! Rows are partitioned by the distinct values of a group column (null is
//! a group of its own) and each partition's non-null values are reduced to
//! a single number. Output groups are sorted ascending with the null group
//! last.
//!
//! # Example
//!
//! ```
//! use u_datalab::aggregation::{aggregate, Reduction};
//! use u_datalab::ingest::ingest;
//! use u_datalab::value::Value;
//!
//! let df = ingest(b"region,sales\nA,10\nB,5\nA,3\n", "csv").unwrap();
//! let totals = aggregate(&df, "region", "sales", Reduction::Sum).unwrap();
//! assert_eq!(totals.row(0), vec![Value::from("A"), Value::from(13.0)]);
//! assert_eq!(totals.row(1), vec![Value::from("B"), Value::from(5.0)]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::dataframe::{Column, DataFrame, ValidityBitmap};
use crate::error::{DataLabError, Result};
use crate::value::Value;

/// Reduction applied to each group's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    Mean,
    Sum,
    Max,
    Min,
}

/// Reduces a group's non-null values; `None` yields a null cell.
type Reducer = fn(&[f64]) -> Option<f64>;

impl Reduction {
    pub const ALL: [Self; 4] = [Self::Mean, Self::Sum, Self::Max, Self::Min];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    fn reducer(&self) -> Reducer {
        match self {
            Self::Mean => reduce_mean,
            Self::Sum => reduce_sum,
            Self::Max => reduce_max,
            Self::Min => reduce_min,
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reduction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| format!("unknown reduction '{s}'"))
    }
}

fn reduce_mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().mean())
}

fn reduce_sum(values: &[f64]) -> Option<f64> {
    Some(values.iter().fold(0.0, |acc, v| acc + v))
}

fn reduce_max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn reduce_min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// A complete aggregation request.
///
/// ```
/// use u_datalab::aggregation::{AggregationSpec, Reduction};
///
/// let spec: AggregationSpec = serde_json::from_str(
///     r#"{"group_column": "region", "value_column": "sales", "reduction": "max"}"#,
/// ).unwrap();
/// assert_eq!(spec.reduction, Reduction::Max);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_column: String,
    pub value_column: String,
    pub reduction: Reduction,
}

impl AggregationSpec {
    pub fn new(
        group_column: impl Into<String>,
        value_column: impl Into<String>,
        reduction: Reduction,
    ) -> Self {
        Self {
            group_column: group_column.into(),
            value_column: value_column.into(),
            reduction,
        }
    }

    /// Runs [`aggregate`] with this spec.
    pub fn apply(&self, store: &DataFrame) -> Result<DataFrame> {
        aggregate(store, &self.group_column, &self.value_column, self.reduction)
    }
}

/// Groups `store` by `group_column` and reduces `value_column`.
///
/// The result has columns `[group_column, value_column]` and one row per
/// distinct group value. The group column keeps its kind. Mean, max and
/// min of a group with no non-null values are null; its sum is 0.
///
/// # Errors
///
/// - [`EmptySelection`](DataLabError::EmptySelection) or
///   [`ColumnNotFound`](DataLabError::ColumnNotFound) for a bad column name
/// - [`InvalidAggregationTarget`](DataLabError::InvalidAggregationTarget) if
///   `value_column` is not numeric
/// - [`DuplicateColumn`](DataLabError::DuplicateColumn) if both names are the same
pub fn aggregate(
    store: &DataFrame,
    group_column: &str,
    value_column: &str,
    reduction: Reduction,
) -> Result<DataFrame> {
    let (_, groups) = store.require_column(group_column)?;
    let (_, target) = store.require_column(value_column)?;

    let Some(values) = target.as_numeric() else {
        return Err(DataLabError::InvalidAggregationTarget {
            column: value_column.to_string(),
            kind: target.kind().to_string(),
        });
    };
    if group_column == value_column {
        return Err(DataLabError::DuplicateColumn {
            name: value_column.to_string(),
        });
    }

    // key → (first row holding the key, non-null values)
    let mut partitions: BTreeMap<Value, (usize, Vec<f64>)> = BTreeMap::new();
    for row in 0..store.row_count() {
        let (_, members) = partitions
            .entry(groups.value_at(row))
            .or_insert_with(|| (row, Vec::new()));
        if target.is_valid(row) {
            members.push(values[row]);
        }
    }

    let reduce = reduction.reducer();
    let representatives: Vec<usize> = partitions.values().map(|(row, _)| *row).collect();
    let reduced: Vec<Option<f64>> = partitions.values().map(|(_, vals)| reduce(vals)).collect();
    let validity: ValidityBitmap = reduced.iter().map(Option::is_some).collect();
    let results = Column::numeric(
        reduced.iter().map(|r| r.unwrap_or(0.0)).collect(),
        validity,
    );

    debug!(
        group_column,
        value_column,
        %reduction,
        groups = representatives.len(),
        "aggregated"
    );
    DataFrame::from_columns(vec![
        (group_column.to_string(), groups.take(&representatives)),
        (value_column.to_string(), results),
    ])
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::ColumnKind;

    fn sales() -> DataFrame {
        DataFrame::from_rows(
            vec!["region".into(), "sales".into(), "note".into()],
            &[
                vec!["B".into(), Value::from(5.0), "x".into()],
                vec!["A".into(), Value::from(10.0), "y".into()],
                vec![Value::Null, Value::from(7.0), "z".into()],
                vec!["A".into(), Value::from(3.0), "x".into()],
                vec!["C".into(), Value::Null, "x".into()],
            ],
        )
        .unwrap()
    }

    fn run(reduction: Reduction) -> Vec<Vec<Value>> {
        let out = aggregate(&sales(), "region", "sales", reduction).unwrap();
        out.to_rows().1
    }

    #[test]
    fn sum_by_group_sorted_with_null_last() {
        assert_eq!(
            run(Reduction::Sum),
            vec![
                vec![Value::from("A"), Value::from(13.0)],
                vec![Value::from("B"), Value::from(5.0)],
                vec![Value::from("C"), Value::from(0.0)],
                vec![Value::Null, Value::from(7.0)],
            ]
        );
    }

    #[test]
    fn mean_max_min() {
        let mean = run(Reduction::Mean);
        assert_eq!(mean[0][1], Value::from(6.5));
        assert_eq!(mean[2][1], Value::Null);

        let max = run(Reduction::Max);
        assert_eq!(max[0][1], Value::from(10.0));
        assert_eq!(max[2][1], Value::Null);

        let min = run(Reduction::Min);
        assert_eq!(min[0][1], Value::from(3.0));
    }

    #[test]
    fn output_columns_and_kinds() {
        let out = aggregate(&sales(), "region", "sales", Reduction::Sum).unwrap();
        assert_eq!(out.column_names(), &["region", "sales"]);
        assert_eq!(out.schema()[0].1, ColumnKind::Categorical);
        assert_eq!(out.schema()[1].1, ColumnKind::Numeric);
    }

    #[test]
    fn numeric_group_keys_sort_numerically() {
        let df = DataFrame::from_rows(
            vec!["year".into(), "v".into()],
            &[
                vec![Value::from(2020.0), Value::from(1.0)],
                vec![Value::from(2019.0), Value::from(2.0)],
                vec![Value::from(100.0), Value::from(3.0)],
            ],
        )
        .unwrap();
        let out = aggregate(&df, "year", "v", Reduction::Sum).unwrap();
        assert_eq!(
            out.column(0).unwrap().as_numeric().unwrap(),
            &[100.0, 2019.0, 2020.0]
        );
    }

    #[test]
    fn non_numeric_target_rejected() {
        let err = aggregate(&sales(), "region", "note", Reduction::Sum).unwrap_err();
        assert_eq!(
            err,
            DataLabError::InvalidAggregationTarget {
                column: "note".into(),
                kind: "categorical".into()
            }
        );
    }

    #[test]
    fn same_group_and_value_column() {
        let err = aggregate(&sales(), "sales", "sales", Reduction::Max).unwrap_err();
        assert_eq!(err, DataLabError::DuplicateColumn { name: "sales".into() });
    }

    #[test]
    fn empty_frame_aggregates_to_no_groups() {
        let df = sales().head(0);
        let out = aggregate(&df, "region", "sales", Reduction::Mean).unwrap();
        assert_eq!(out.row_count(), 0);
        assert_eq!(out.column_count(), 2);
    }

    #[test]
    fn spec_round_trip_and_names() {
        let spec = AggregationSpec::new("region", "sales", Reduction::Sum);
        assert_eq!(spec.apply(&sales()).unwrap().row_count(), 4);
        for r in Reduction::ALL {
            assert_eq!(r.to_string().parse::<Reduction>().unwrap(), r);
        }
    }
}
