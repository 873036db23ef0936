//! # u-datalab
//!
//! Data-wrangling core for interactive tabular analysis.
//!
//! u-datalab takes a user's file from raw bytes to cleaned, filtered,
//! summarized and grouped tables. Every stage borrows a [`DataFrame`] and
//! returns a new one (or a derived result); a failing stage returns an
//! error and changes nothing.
//!
//! ```text
//! ingest → filter → cleaning → statistics / aggregation
//! ```
//!
//! ## Modules
//!
//! - [`dataframe`] — Column-major tabular data model (DataFrame, Column, ColumnKind)
//! - [`value`] — Scalar cell values with a total order
//! - [`ingest`] — CSV/XLSX/XLS/JSON ingestion with UTF-8 → GB18030 decode fallback
//! - [`csv_parser`] — RFC 4180 CSV parsing with null markers
//! - [`cleaning`] — Duplicate removal and missing-value imputation (keep, drop, mean, median, mode)
//! - [`filter`] — Row restriction by allowed value sets
//! - [`statistics`] — Describe, Pearson correlation matrix, Welch/Student t-test
//! - [`aggregation`] — Group-by with mean/sum/max/min
//! - [`profiling`] — Dataset overview and value counts
//! - [`session`] — Per-user context holding the active dataset
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_datalab::aggregation::{aggregate, Reduction};
//! use u_datalab::cleaning::{impute, MissingPolicy};
//! use u_datalab::dataframe::ColumnKind;
//! use u_datalab::ingest::ingest;
//! use u_datalab::value::Value;
//!
//! let csv = "region,sales\nA,10\nB,5\nA,\nA,3\n";
//! let df = ingest(csv.as_bytes(), "csv").unwrap();
//!
//! assert_eq!(df.row_count(), 4);
//! assert_eq!(df.schema()[0].1, ColumnKind::Categorical);
//! assert_eq!(df.schema()[1].1, ColumnKind::Numeric);
//!
//! let df = impute(&df, "sales", MissingPolicy::DropRows).unwrap();
//! let totals = aggregate(&df, "region", "sales", Reduction::Sum).unwrap();
//! assert_eq!(totals.row(0), vec![Value::from("A"), Value::from(13.0)]);
//! ```

pub mod aggregation;
pub mod cleaning;
pub mod csv_parser;
pub mod dataframe;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod profiling;
pub mod session;
pub mod statistics;
pub mod value;

pub use dataframe::DataFrame;
pub use error::{DataLabError, Result};
pub use session::Session;
pub use value::Value;
