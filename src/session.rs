//! Per-user session holding the active dataset.
//!
//! A [`Session`] is explicit context passed by the caller. Transforming
//! stages replace the held dataset only when they succeed; read-only
//! stages borrow it.
//!
//! ```
//! use u_datalab::cleaning::MissingPolicy;
//! use u_datalab::session::Session;
//!
//! let mut session = Session::new();
//! session.load(b"region,sales\nA,10\nA,10\nB,\n", "csv").unwrap();
//! assert_eq!(session.deduplicate().unwrap(), 1);
//!
//! // fill-mean on a categorical column fails and keeps the dataset as it was
//! assert!(session.impute("region", MissingPolicy::FillMean).is_err());
//! assert_eq!(session.data().unwrap().row_count(), 2);
//!
//! session.impute("sales", MissingPolicy::DropRows).unwrap();
//! assert_eq!(session.data().unwrap().row_count(), 1);
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::aggregation::AggregationSpec;
use crate::cleaning::{self, ColumnPolicy, MissingPolicy};
use crate::dataframe::DataFrame;
use crate::error::{DataLabError, Result};
use crate::filter::{self, ColumnFilter};
use crate::ingest::{self, IngestOptions};
use crate::profiling::{self, DatasetOverview};
use crate::statistics::{
    self, CategoricalSummary, ColumnSummary, CorrelationMatrix, TTestResult, TTestVariance,
};
use crate::value::Value;

/// The active dataset and the options used to load it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<DataFrame>,
    options: IngestOptions,
}

impl Session {
    /// Creates an empty session with default ingestion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session with the given ingestion options.
    pub fn with_options(options: IngestOptions) -> Self {
        Self {
            dataset: None,
            options,
        }
    }

    /// Returns the active dataset, if any.
    pub fn dataset(&self) -> Option<&DataFrame> {
        self.dataset.as_ref()
    }

    /// Returns the active dataset, or [`EmptySelection`](DataLabError::EmptySelection)
    /// when nothing is loaded.
    pub fn data(&self) -> Result<&DataFrame> {
        self.dataset
            .as_ref()
            .ok_or_else(|| DataLabError::empty_selection("dataset"))
    }

    /// Discards the active dataset.
    pub fn clear(&mut self) {
        self.dataset = None;
    }

    // ── Transforming stages ──────────────────────────────────────

    /// Ingests a file and makes it the active dataset. A failed load keeps
    /// the previous dataset.
    pub fn load(&mut self, bytes: &[u8], extension: &str) -> Result<&DataFrame> {
        match ingest::ingest_with(bytes, extension, &self.options) {
            Ok(df) => Ok(&*self.dataset.insert(df)),
            Err(e) => {
                warn!(extension, error = %e, "load failed");
                Err(e)
            }
        }
    }

    /// Removes duplicate rows and returns how many were removed.
    pub fn deduplicate(&mut self) -> Result<usize> {
        let current = self.data()?;
        let (deduped, removed) = cleaning::deduplicate(current);
        self.dataset = Some(deduped);
        Ok(removed)
    }

    /// Applies a missing-value policy to one column.
    pub fn impute(&mut self, column: &str, policy: MissingPolicy) -> Result<&DataFrame> {
        self.apply("impute", |df| cleaning::impute(df, column, policy))
    }

    /// Applies a per-column cleaning plan, all or nothing.
    pub fn clean(&mut self, plan: &[ColumnPolicy]) -> Result<&DataFrame> {
        self.apply("clean", |df| cleaning::clean(df, plan))
    }

    /// Keeps rows whose `column` value is in `allowed`.
    pub fn restrict(&mut self, column: &str, allowed: &HashSet<Value>) -> Result<&DataFrame> {
        self.apply("restrict", |df| filter::restrict(df, column, allowed))
    }

    /// Keeps rows matching every filter.
    pub fn restrict_all(&mut self, filters: &[ColumnFilter]) -> Result<&DataFrame> {
        self.apply("restrict_all", |df| filter::restrict_all(df, filters))
    }

    /// Runs `stage` on the active dataset and keeps its output on success.
    fn apply<F>(&mut self, stage: &str, f: F) -> Result<&DataFrame>
    where
        F: FnOnce(&DataFrame) -> Result<DataFrame>,
    {
        let current = self.data()?;
        match f(current) {
            Ok(df) => {
                debug!(stage, rows = df.row_count(), "stage applied");
                Ok(&*self.dataset.insert(df))
            }
            Err(e) => {
                warn!(stage, error = %e, "stage failed, dataset unchanged");
                Err(e)
            }
        }
    }

    // ── Read-only stages ─────────────────────────────────────────

    /// Shape, missing-value and kind summary of the active dataset.
    pub fn overview(&self) -> Result<DatasetOverview> {
        Ok(profiling::profile_dataset(self.data()?))
    }

    /// Summary statistics of every numeric column.
    pub fn describe(&self) -> Result<Vec<ColumnSummary>> {
        Ok(statistics::describe(self.data()?))
    }

    /// Count, cardinality and most frequent value of every categorical column.
    pub fn describe_categorical(&self) -> Result<Vec<CategoricalSummary>> {
        Ok(statistics::describe_categorical(self.data()?))
    }

    /// Pearson correlation matrix over the numeric columns.
    pub fn correlate(&self) -> Result<CorrelationMatrix> {
        Ok(statistics::correlate(self.data()?))
    }

    /// Independent two-sample t-test between columns `a` and `b`.
    pub fn t_test(&self, a: &str, b: &str, variance: TTestVariance) -> Result<TTestResult> {
        statistics::t_test(self.data()?, a, b, variance)
    }

    /// Groups the active dataset as `spec` describes.
    pub fn aggregate(&self, spec: &AggregationSpec) -> Result<DataFrame> {
        spec.apply(self.data()?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Reduction;

    const CSV: &[u8] = b"region,sales\nA,10\nB,5\nA,3\nB,\n";

    fn loaded() -> Session {
        let mut session = Session::new();
        session.load(CSV, "csv").unwrap();
        session
    }

    #[test]
    fn empty_session_reports_empty_selection() {
        let mut session = Session::new();
        let expected = DataLabError::EmptySelection {
            what: "dataset".into(),
        };
        assert_eq!(session.data().unwrap_err(), expected);
        assert_eq!(session.deduplicate().unwrap_err(), expected);
        assert_eq!(session.describe().unwrap_err(), expected);
        assert_eq!(
            session.impute("x", MissingPolicy::Keep).unwrap_err(),
            expected
        );
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut session = loaded();
        assert!(session.load(b"x", "parquet").is_err());
        assert_eq!(session.data().unwrap().row_count(), 4);
    }

    #[test]
    fn failed_stage_keeps_dataset() {
        let mut session = loaded();
        let before = session.data().unwrap().clone();
        assert!(session.impute("region", MissingPolicy::FillMedian).is_err());
        assert!(session.restrict("nope", &HashSet::new()).is_err());
        assert_eq!(session.data().unwrap(), &before);
    }

    #[test]
    fn stages_chain_on_held_dataset() {
        let mut session = loaded();
        session
            .restrict(
                "region",
                &[Value::from("B")].into_iter().collect(),
            )
            .unwrap();
        session.impute("sales", MissingPolicy::FillMean).unwrap();
        let df = session.data().unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.column(1).unwrap().as_numeric().unwrap(), &[5.0, 5.0]);
    }

    #[test]
    fn read_only_stages_borrow() {
        let session = loaded();
        let totals = session
            .aggregate(&AggregationSpec::new("region", "sales", Reduction::Sum))
            .unwrap();
        assert_eq!(totals.row(0), vec![Value::from("A"), Value::from(13.0)]);
        assert_eq!(session.overview().unwrap().missing_count, 1);
        assert_eq!(session.describe().unwrap().len(), 1);
        assert!(session.correlate().unwrap().is_empty());
        assert_eq!(session.data().unwrap().row_count(), 4);
    }

    #[test]
    fn clean_plan_through_session() {
        let mut session = loaded();
        session
            .clean(&[ColumnPolicy::new("sales", MissingPolicy::DropRows)])
            .unwrap();
        assert_eq!(session.data().unwrap().row_count(), 3);
    }

    #[test]
    fn clear_discards_dataset() {
        let mut session = loaded();
        session.clear();
        assert!(session.dataset().is_none());
    }
}
