//! Descriptive statistics, correlation and two-sample hypothesis tests.
//!
//! All computations skip nulls. Moments come from [`statrs`]; quartiles
//! use linear interpolation between order statistics.
//!
//! # Example
//!
//! ```
//! use u_datalab::ingest::ingest;
//! use u_datalab::statistics::{correlate, describe};
//!
//! let df = ingest(b"x,y\n1,2\n2,4\n3,6\n4,8\n", "csv").unwrap();
//!
//! let summary = describe(&df);
//! assert_eq!(summary[0].count, 4);
//! assert_eq!(summary[0].stats.as_ref().unwrap().median, 2.5);
//!
//! let corr = correlate(&df);
//! assert!((corr.get("x", "y").unwrap() - 1.0).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::dataframe::{Column, ColumnKind, DataFrame};
use crate::error::{DataLabError, Result};
use crate::profiling::value_frequencies;

/// Fixed significance threshold for [`TTestResult::is_significant`].
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

// ── Descriptive statistics ────────────────────────────────────────────

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Number of non-null values.
    pub count: usize,
    /// `None` when the column has no non-null values.
    pub stats: Option<NumericSummary>,
}

/// Moments and order statistics of a column's non-null values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation (n − 1). NaN for a single value.
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q1: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q3: f64,
    pub max: f64,
}

/// Summary of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    /// Number of distinct non-null values.
    pub unique: usize,
    /// Most frequent value; ties go to the smallest.
    pub top: Option<String>,
    /// Occurrences of `top`.
    pub freq: usize,
}

/// Summarizes every numeric column, in column order.
pub fn describe(store: &DataFrame) -> Vec<ColumnSummary> {
    store
        .iter()
        .filter(|(_, col)| col.kind() == ColumnKind::Numeric)
        .map(|(name, col)| summarize(name, col))
        .collect()
}

/// Summarizes every categorical column, in column order.
pub fn describe_categorical(store: &DataFrame) -> Vec<CategoricalSummary> {
    store
        .iter()
        .filter(|(_, col)| col.kind() == ColumnKind::Categorical)
        .map(|(name, col)| {
            let frequencies = value_frequencies(col);
            let (top, freq) = frequencies
                .first()
                .map_or((None, 0), |(v, n)| (Some(v.to_string()), *n));
            CategoricalSummary {
                column: name.to_string(),
                count: col.valid_count(),
                unique: frequencies.len(),
                top,
                freq,
            }
        })
        .collect()
}

fn summarize(name: &str, col: &Column) -> ColumnSummary {
    let mut values = col.valid_numeric_values().unwrap_or_default();
    let count = values.len();
    let stats = (!values.is_empty()).then(|| {
        values.sort_by(f64::total_cmp);
        NumericSummary {
            mean: values.iter().mean(),
            std: values.iter().std_dev(),
            min: values[0],
            q1: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q3: quantile_sorted(&values, 0.75),
            max: values[count - 1],
        }
    });
    ColumnSummary {
        column: name.to_string(),
        count,
        stats,
    }
}

/// Quantile `q` of ascending `sorted` values by linear interpolation
/// between the closest ranks. NaN for empty input.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

// ── Correlation ───────────────────────────────────────────────────────

/// Pearson correlation matrix over numeric columns.
///
/// `values[i][j]` is the coefficient between `names[i]` and `names[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Returns the coefficient for a pair of column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }

    /// Number of columns in the matrix.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Pearson correlation between every pair of numeric columns.
///
/// Each pair uses the rows where both columns are non-null. The diagonal
/// is 1.0 and the matrix is symmetric. Pairs with fewer than two complete
/// rows, or with a constant side, are NaN. With fewer than two numeric
/// columns the matrix is empty.
pub fn correlate(store: &DataFrame) -> CorrelationMatrix {
    let numeric: Vec<(&str, &Column)> = store
        .iter()
        .filter(|(_, col)| col.kind() == ColumnKind::Numeric)
        .collect();
    if numeric.len() < 2 {
        return CorrelationMatrix {
            names: Vec::new(),
            values: Vec::new(),
        };
    }

    let k = numeric.len();
    let mut values = vec![vec![1.0; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(numeric[i].1, numeric[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    debug!(columns = k, "computed correlation matrix");

    CorrelationMatrix {
        names: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

fn pearson(a: &Column, b: &Column) -> f64 {
    let (Some(xs), Some(ys)) = (a.as_numeric(), b.as_numeric()) else {
        return f64::NAN;
    };
    let (x, y): (Vec<f64>, Vec<f64>) = (0..a.len())
        .filter(|&i| a.is_valid(i) && b.is_valid(i))
        .map(|i| (xs[i], ys[i]))
        .unzip();
    if x.len() < 2 {
        return f64::NAN;
    }

    let sx = x.iter().std_dev();
    let sy = y.iter().std_dev();
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }
    let r = x.iter().covariance(y.iter()) / (sx * sy);
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

// ── Hypothesis tests ──────────────────────────────────────────────────

/// Variance assumption for the independent two-sample t-test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TTestVariance {
    /// Unequal variances with Welch–Satterthwaite degrees of freedom.
    #[default]
    Welch,
    /// Equal variances, pooled estimate (Student).
    Pooled,
}

impl TTestVariance {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welch => "welch",
            Self::Pooled => "pooled",
        }
    }
}

impl fmt::Display for TTestVariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TTestVariance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "welch" => Ok(Self::Welch),
            "pooled" => Ok(Self::Pooled),
            other => Err(format!("unknown t-test variance '{other}'")),
        }
    }
}

/// Outcome of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTestResult {
    /// t statistic of mean(a) − mean(b).
    pub statistic: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

impl TTestResult {
    /// `true` when `p_value` is below [`SIGNIFICANCE_LEVEL`].
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }
}

/// Welch two-sample t-test on the non-null values of columns `a` and `b`.
///
/// ```
/// use u_datalab::ingest::ingest;
/// use u_datalab::statistics::independent_t_test;
///
/// let df = ingest(b"a,b\n1,1\n2,2\n3,3\n", "csv").unwrap();
/// let result = independent_t_test(&df, "a", "b").unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert!((result.p_value - 1.0).abs() < 1e-9);
/// assert!(!result.is_significant());
/// ```
pub fn independent_t_test(store: &DataFrame, a: &str, b: &str) -> Result<TTestResult> {
    t_test(store, a, b, TTestVariance::Welch)
}

/// Independent two-sample t-test with a chosen variance assumption.
///
/// The columns are treated as independent samples, not paired rows.
///
/// # Errors
///
/// - [`ColumnNotFound`](DataLabError::ColumnNotFound) or
///   [`EmptySelection`](DataLabError::EmptySelection) for a bad column name
/// - [`NonNumericColumn`](DataLabError::NonNumericColumn) if either column is not numeric
/// - [`InsufficientData`](DataLabError::InsufficientData) if either sample has fewer than 2 values
/// - [`NonFiniteStatistic`](DataLabError::NonFiniteStatistic) if the variances
///   overflow, so the standard error or degrees of freedom are not finite
pub fn t_test(
    store: &DataFrame,
    a: &str,
    b: &str,
    variance: TTestVariance,
) -> Result<TTestResult> {
    let xs = sample(store, a)?;
    let ys = sample(store, b)?;

    let (na, nb) = (xs.len() as f64, ys.len() as f64);
    let diff = xs.iter().mean() - ys.iter().mean();
    let (va, vb) = (xs.iter().variance(), ys.iter().variance());

    let (se2, df) = match variance {
        TTestVariance::Welch => {
            let (wa, wb) = (va / na, vb / nb);
            let se2 = wa + wb;
            let denom = wa * wa / (na - 1.0) + wb * wb / (nb - 1.0);
            let df = if denom > 0.0 {
                se2 * se2 / denom
            } else {
                na + nb - 2.0
            };
            (se2, df)
        }
        TTestVariance::Pooled => {
            let pooled = ((na - 1.0) * va + (nb - 1.0) * vb) / (na + nb - 2.0);
            (pooled * (1.0 / na + 1.0 / nb), na + nb - 2.0)
        }
    };

    let result = if se2 <= 0.0 {
        if diff == 0.0 {
            TTestResult {
                statistic: 0.0,
                p_value: 1.0,
                degrees_of_freedom: df,
            }
        } else {
            TTestResult {
                statistic: f64::INFINITY.copysign(diff),
                p_value: 0.0,
                degrees_of_freedom: df,
            }
        }
    } else {
        if !se2.is_finite() || !df.is_finite() {
            return Err(DataLabError::NonFiniteStatistic {
                what: "t-test standard error".to_string(),
            });
        }
        let statistic = diff / se2.sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| DataLabError::NonFiniteStatistic {
            what: "t-test degrees of freedom".to_string(),
        })?;
        TTestResult {
            statistic,
            p_value: (2.0 * dist.sf(statistic.abs())).clamp(0.0, 1.0),
            degrees_of_freedom: df,
        }
    };

    debug!(
        a,
        b,
        %variance,
        statistic = result.statistic,
        p_value = result.p_value,
        "t-test"
    );
    Ok(result)
}

fn sample(store: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let (_, col) = store.require_column(name)?;
    let values = col
        .valid_numeric_values()
        .ok_or_else(|| DataLabError::NonNumericColumn {
            column: name.to_string(),
        })?;
    if values.len() < 2 {
        return Err(DataLabError::InsufficientData {
            min_required: 2,
            actual: values.len(),
        });
    }
    Ok(values)
}

// ── Tests ─────────────────────────────────────────────────────────────
