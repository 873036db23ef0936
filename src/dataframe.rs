//! Column-major DataFrame for tabular data.
//!
//! The [`DataFrame`] stores data in column-major order with typed columns
//! and a compact validity bitmap for tracking missing values. It is the
//! store every pipeline stage consumes and returns.
//!
//! # Column Types
//!
//! | Type | Storage | Kind |
//! |------|---------|------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` + bitmap | [`ColumnKind::Numeric`] |
//! | [`Categorical`](Column::Categorical) | Dictionary + `Vec<u32>` | [`ColumnKind::Categorical`] |
//! | [`Boolean`](Column::Boolean) | `Vec<bool>` + bitmap | [`ColumnKind::Other`] |
//!
//! # Example
//!
//! ```
//! use u_datalab::dataframe::{Column, ColumnKind, DataFrame};
//! use u_datalab::value::Value;
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "sales".to_string(),
//!     Column::from_values(&[Value::from(10.0), Value::Null, Value::from(3.0)]),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.schema(), vec![("sales", ColumnKind::Numeric)]);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{DataLabError, Result};
use crate::value::Value;

// ── ValidityBitmap ────────────────────────────────────────────────────

/// Bit-packed validity bitmap using `Vec<u64>`.
///
/// Each bit indicates whether the corresponding row is valid (1) or
/// missing/null (0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityBitmap {
    bits: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Creates a bitmap where all `len` positions are valid.
    pub fn all_valid(len: usize) -> Self {
        let n_words = len.div_ceil(64);
        let mut bits = vec![u64::MAX; n_words];
        let trailing = len % 64;
        if trailing != 0 && n_words > 0 {
            bits[n_words - 1] = (1u64 << trailing) - 1;
        }
        Self { bits, len }
    }

    /// Creates a bitmap where all `len` positions are invalid (null).
    pub fn all_invalid(len: usize) -> Self {
        Self {
            bits: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Creates an empty bitmap with no rows.
    pub fn empty() -> Self {
        Self {
            bits: Vec::new(),
            len: 0,
        }
    }

    /// Returns `true` if the value at `idx` is valid (not null).
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks position `idx` as invalid (null).
    #[inline]
    pub fn set_invalid(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "index {idx} out of bounds (len={})", self.len);
        self.bits[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Appends a new position (valid or invalid).
    pub fn push(&mut self, valid: bool) {
        let idx = self.len;
        self.len += 1;
        if idx / 64 >= self.bits.len() {
            self.bits.push(0);
        }
        if valid {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Returns the total number of tracked positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bitmap tracks zero positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts the number of null (invalid) positions.
    pub fn null_count(&self) -> usize {
        let valid_count: usize = self.bits.iter().map(|w| w.count_ones() as usize).sum();
        self.len - valid_count
    }

    /// Counts the number of valid (non-null) positions.
    pub fn valid_count(&self) -> usize {
        self.len - self.null_count()
    }

    /// Returns an iterator over indices of valid positions.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.is_valid(i))
    }

    /// Builds a bitmap holding the bits at `indices`, in that order.
    fn take(&self, indices: &[usize]) -> Self {
        indices.iter().map(|&i| self.is_valid(i)).collect()
    }
}

impl FromIterator<bool> for ValidityBitmap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bm = Self::empty();
        for valid in iter {
            bm.push(valid);
        }
        bm
    }
}

// ── ColumnKind ────────────────────────────────────────────────────────

/// Coarse kind of a column, derived from its values.
///
/// A column is numeric when every non-null value parses as a number,
/// categorical when it holds other strings, and `Other` for booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-null value is a number.
    Numeric,
    /// String values.
    Categorical,
    /// Booleans.
    Other,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with validity bitmap for missing values.
///
/// Invalid positions hold a placeholder (`0.0`, `false`, or dictionary
/// index `0`) that is ignored through the bitmap.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values. Null positions hold `0.0`.
    Numeric {
        values: Vec<f64>,
        validity: ValidityBitmap,
    },
    /// Boolean values. Null positions hold `false`.
    Boolean {
        values: Vec<bool>,
        validity: ValidityBitmap,
    },
    /// Dictionary-encoded string column.
    ///
    /// `dictionary` contains unique string values and `indices` maps each
    /// row to a dictionary entry.
    Categorical {
        dictionary: Vec<String>,
        indices: Vec<u32>,
        validity: ValidityBitmap,
    },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, validity: ValidityBitmap) -> Self {
        Self::Numeric { values, validity }
    }

    /// Creates a boolean column.
    pub fn boolean(values: Vec<bool>, validity: ValidityBitmap) -> Self {
        Self::Boolean { values, validity }
    }

    /// Creates a categorical column from a dictionary and indices.
    pub fn categorical(
        dictionary: Vec<String>,
        indices: Vec<u32>,
        validity: ValidityBitmap,
    ) -> Self {
        Self::Categorical {
            dictionary,
            indices,
            validity,
        }
    }

    /// Builds a column from row values, inferring its kind.
    ///
    /// - no non-null values → numeric, all null
    /// - every non-null value is a number or numeric text → numeric
    /// - every non-null value is a boolean → boolean
    /// - otherwise → categorical, with each value rendered as a string
    ///
    /// NaN numbers are stored as null.
    ///
    /// ```
    /// use u_datalab::dataframe::{Column, ColumnKind};
    /// use u_datalab::value::Value;
    ///
    /// let col = Column::from_values(&[Value::from("1"), Value::from(" 2.5 "), Value::Null]);
    /// assert_eq!(col.kind(), ColumnKind::Numeric);
    /// assert_eq!(col.null_count(), 1);
    ///
    /// let col = Column::from_values(&[Value::from("A"), Value::from(3.0)]);
    /// assert_eq!(col.kind(), ColumnKind::Categorical);
    /// ```
    pub fn from_values(values: &[Value]) -> Self {
        if values.iter().all(is_missing) {
            return Self::numeric(vec![0.0; values.len()], ValidityBitmap::all_invalid(values.len()));
        }

        if values
            .iter()
            .filter(|v| !is_missing(v))
            .all(|v| v.as_f64().is_some_and(|n| !n.is_nan()))
        {
            let mut nums = Vec::with_capacity(values.len());
            let mut validity = ValidityBitmap::empty();
            for v in values {
                match v.as_f64().filter(|n| !n.is_nan()) {
                    Some(n) => {
                        nums.push(n);
                        validity.push(true);
                    }
                    None => {
                        nums.push(0.0);
                        validity.push(false);
                    }
                }
            }
            return Self::numeric(nums, validity);
        }

        if values
            .iter()
            .filter(|v| !is_missing(v))
            .all(|v| matches!(v, Value::Bool(_)))
        {
            let bools = values.iter().map(|v| matches!(v, Value::Bool(true))).collect();
            let validity = values.iter().map(|v| !is_missing(v)).collect();
            return Self::boolean(bools, validity);
        }

        let mut dict_map: HashMap<String, u32> = HashMap::new();
        let mut dictionary: Vec<String> = Vec::new();
        let mut indices = Vec::with_capacity(values.len());
        let mut validity = ValidityBitmap::empty();
        for v in values {
            if is_missing(v) {
                indices.push(0);
                validity.push(false);
                continue;
            }
            let key = v.to_string();
            let idx = match dict_map.get(&key) {
                Some(&existing) => existing,
                None => {
                    let idx = dictionary.len() as u32;
                    dictionary.push(key.clone());
                    dict_map.insert(key, idx);
                    idx
                }
            };
            indices.push(idx);
            validity.push(true);
        }
        Self::categorical(dictionary, indices, validity)
    }

    /// Returns the kind of this column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric { .. } => ColumnKind::Numeric,
            Self::Categorical { .. } => ColumnKind::Categorical,
            Self::Boolean { .. } => ColumnKind::Other,
        }
    }

    /// Returns the number of rows in this column.
    pub fn len(&self) -> usize {
        self.validity().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        match self {
            Self::Numeric { validity, .. }
            | Self::Boolean { validity, .. }
            | Self::Categorical { validity, .. } => validity,
        }
    }

    /// Returns the number of null values.
    pub fn null_count(&self) -> usize {
        self.validity().null_count()
    }

    /// Returns the number of valid (non-null) values.
    pub fn valid_count(&self) -> usize {
        self.validity().valid_count()
    }

    /// Returns `true` if the value at `idx` is valid (not null).
    pub fn is_valid(&self, idx: usize) -> bool {
        self.validity().is_valid(idx)
    }

    /// Returns the raw numeric values, or `None` if not a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Returns valid numeric values (nulls excluded) as a new `Vec<f64>`.
    pub fn valid_numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, validity } => {
                Some(validity.valid_indices().map(|i| values[i]).collect())
            }
            _ => None,
        }
    }

    /// Returns the category string at `idx` in a categorical column.
    pub fn category_at(&self, idx: usize) -> Option<&str> {
        match self {
            Self::Categorical {
                dictionary,
                indices,
                validity,
            } if validity.is_valid(idx) => dictionary.get(indices[idx] as usize).map(String::as_str),
            _ => None,
        }
    }

    /// Returns the value at `idx` as a [`Value`].
    pub fn value_at(&self, idx: usize) -> Value {
        if !self.is_valid(idx) {
            return Value::Null;
        }
        match self {
            Self::Numeric { values, .. } => Value::Number(values[idx]),
            Self::Boolean { values, .. } => Value::Bool(values[idx]),
            Self::Categorical {
                dictionary,
                indices,
                ..
            } => dictionary
                .get(indices[idx] as usize)
                .map_or(Value::Null, |s| Value::Text(s.clone())),
        }
    }

    /// Returns every row as a [`Value`].
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }

    /// Returns the non-null values.
    pub fn valid_values(&self) -> Vec<Value> {
        self.validity()
            .valid_indices()
            .map(|i| self.value_at(i))
            .collect()
    }

    /// Builds a column holding the rows at `indices`, in that order.
    ///
    /// The column keeps its variant; categorical columns keep their
    /// dictionary.
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::Numeric { values, validity } => Self::Numeric {
                values: indices.iter().map(|&i| values[i]).collect(),
                validity: validity.take(indices),
            },
            Self::Boolean { values, validity } => Self::Boolean {
                values: indices.iter().map(|&i| values[i]).collect(),
                validity: validity.take(indices),
            },
            Self::Categorical {
                dictionary,
                indices: codes,
                validity,
            } => Self::Categorical {
                dictionary: dictionary.clone(),
                indices: indices.iter().map(|&i| codes[i]).collect(),
                validity: validity.take(indices),
            },
        }
    }
}

/// Null, or a NaN number.
fn is_missing(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Number(n) => n.is_nan(),
        _ => false,
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major tabular data structure.
///
/// Stores uniquely named columns of typed data. All columns have the same
/// number of rows.
///
/// ```
/// use u_datalab::dataframe::{Column, DataFrame};
/// use u_datalab::value::Value;
///
/// let df = DataFrame::from_columns(vec![
///     ("region".to_string(), Column::from_values(&["A".into(), "B".into()])),
///     ("sales".to_string(), Column::from_values(&[Value::from(10.0), Value::from(5.0)])),
/// ]).unwrap();
/// assert_eq!(df.row(1), vec![Value::from("B"), Value::from(5.0)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame with no columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a DataFrame from named columns.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut df = Self::new();
        for (name, col) in columns {
            df.add_column(name, col)?;
        }
        Ok(df)
    }

    /// Builds a DataFrame from a header and row-major values, inferring
    /// each column's kind. Short rows are padded with nulls; long rows are
    /// rejected.
    pub fn from_rows(header: Vec<String>, rows: &[Vec<Value>]) -> Result<Self> {
        let n_cols = header.len();
        let mut raw_columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); n_cols];
        for row in rows {
            if row.len() > n_cols {
                return Err(DataLabError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (col_idx, raw) in raw_columns.iter_mut().enumerate() {
                raw.push(row.get(col_idx).cloned().unwrap_or_default());
            }
        }
        Self::from_columns(
            header
                .into_iter()
                .zip(raw_columns)
                .map(|(name, values)| (name, Column::from_values(&values)))
                .collect(),
        )
    }

    /// Adds a named column to the DataFrame.
    ///
    /// Returns an error if the name is taken or the column length doesn't
    /// match the existing row count (unless this is the first column).
    pub fn add_column(&mut self, name: String, column: Column) -> Result<()> {
        if self.names.contains(&name) {
            return Err(DataLabError::DuplicateColumn { name });
        }
        let col_len = column.len();
        if self.columns.is_empty() {
            self.row_count = col_len;
        } else if col_len != self.row_count {
            return Err(DataLabError::DimensionMismatch {
                expected: self.row_count,
                actual: col_len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Returns a copy with the column at `index` replaced.
    pub(crate) fn with_column_at(&self, index: usize, column: Column) -> Result<Self> {
        if column.len() != self.row_count {
            return Err(DataLabError::DimensionMismatch {
                expected: self.row_count,
                actual: column.len(),
            });
        }
        let mut df = self.clone();
        df.columns[index] = column;
        Ok(df)
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns a reference to the column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns a reference to the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the index of the column with the given `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Resolves a user-selected column name.
    ///
    /// An empty name is an [`EmptySelection`](DataLabError::EmptySelection);
    /// an unknown one is [`ColumnNotFound`](DataLabError::ColumnNotFound).
    pub fn require_column(&self, name: &str) -> Result<(usize, &Column)> {
        if name.is_empty() {
            return Err(DataLabError::empty_selection("column"));
        }
        self.column_index(name)
            .map(|i| (i, &self.columns[i]))
            .ok_or_else(|| DataLabError::column_not_found(name))
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Returns the kind of every column, in column order.
    pub fn schema(&self) -> Vec<(&str, ColumnKind)> {
        self.iter().map(|(name, col)| (name, col.kind())).collect()
    }

    /// Names of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Names of categorical columns, in column order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, col)| col.kind() == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Returns the total number of null values across all columns.
    pub fn total_null_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Returns row `idx` as values in column order.
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value_at(idx)).collect()
    }

    /// Builds a DataFrame holding the rows at `indices`, in that order.
    ///
    /// Column kinds are kept as they are.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            row_count: if self.columns.is_empty() { 0 } else { indices.len() },
        }
    }

    /// Returns the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let indices: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&indices)
    }

    /// Returns the header and row-major values, the shape a single-sheet
    /// workbook exporter writes.
    pub fn to_rows(&self) -> (Vec<String>, Vec<Vec<Value>>) {
        let rows = (0..self.row_count).map(|i| self.row(i)).collect();
        (self.names.clone(), rows)
    }

    /// Returns one column-name → value mapping per row.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..self.row_count)
            .map(|i| {
                self.iter()
                    .map(|(name, col)| (name.to_string(), col.value_at(i).to_json()))
                    .collect()
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[Option<f64>]) -> Vec<Value> {
        items.iter().map(|&x| Value::from(x)).collect()
    }

    // ── ValidityBitmap tests ──────────────────────────────────────

    #[test]
    fn bitmap_all_valid_boundary() {
        let bm = ValidityBitmap::all_valid(65);
        assert_eq!(bm.bits.len(), 2);
        assert_eq!(bm.null_count(), 0);
        assert!(bm.is_valid(64));
    }

    #[test]
    fn bitmap_all_valid_matches_pushed() {
        let pushed: ValidityBitmap = std::iter::repeat(true).take(70).collect();
        assert_eq!(pushed, ValidityBitmap::all_valid(70));
    }

    #[test]
    fn bitmap_take_reorders() {
        let mut bm = ValidityBitmap::all_valid(4);
        bm.set_invalid(1);
        let taken = bm.take(&[1, 3, 1]);
        assert_eq!(taken.len(), 3);
        assert_eq!(taken.valid_indices().collect::<Vec<_>>(), vec![1]);
    }

    // ── Column inference ─────────────────────────────────────────

    #[test]
    fn all_null_is_numeric() {
        let col = Column::from_values(&[Value::Null, Value::Null]);
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.null_count(), 2);
    }

    #[test]
    fn numeric_text_is_numeric() {
        let col = Column::from_values(&["1".into(), "-2.5e1".into()]);
        assert_eq!(col.as_numeric().unwrap(), &[1.0, -25.0]);
    }

    #[test]
    fn nan_becomes_null() {
        let col = Column::from_values(&v(&[Some(1.0), Some(f64::NAN)]));
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert!(!col.is_valid(1));
    }

    #[test]
    fn booleans_are_other() {
        let col = Column::from_values(&[true.into(), Value::Null, false.into()]);
        assert_eq!(col.kind(), ColumnKind::Other);
        assert_eq!(col.value_at(0), Value::Bool(true));
        assert_eq!(col.value_at(1), Value::Null);
    }

    #[test]
    fn mixed_values_are_categorical() {
        let col = Column::from_values(&["A".into(), Value::from(2.0), true.into()]);
        assert_eq!(col.kind(), ColumnKind::Categorical);
        assert_eq!(col.category_at(1), Some("2"));
        assert_eq!(col.category_at(2), Some("true"));
    }

    #[test]
    fn categorical_dictionary_is_shared() {
        let col = Column::from_values(&["x".into(), "y".into(), "x".into()]);
        match col {
            Column::Categorical {
                dictionary,
                indices,
                ..
            } => {
                assert_eq!(dictionary, vec!["x", "y"]);
                assert_eq!(indices, vec![0, 1, 0]);
            }
            other => panic!("expected categorical, got {other:?}"),
        }
    }

    #[test]
    fn take_keeps_kind() {
        let col = Column::from_values(&["1".into(), "n/a".into()]);
        assert_eq!(col.take(&[0]).kind(), ColumnKind::Categorical);
    }

    // ── DataFrame tests ──────────────────────────────────────────

    #[test]
    fn duplicate_name_rejected() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::from_values(&v(&[Some(1.0)])))
            .unwrap();
        let err = df
            .add_column("x".into(), Column::from_values(&v(&[Some(2.0)])))
            .unwrap_err();
        assert_eq!(err, DataLabError::DuplicateColumn { name: "x".into() });
    }

    #[test]
    fn column_length_mismatch() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::from_values(&v(&[Some(1.0), Some(2.0)])))
            .unwrap();
        let result = df.add_column("y".into(), Column::from_values(&v(&[Some(1.0)])));
        assert!(matches!(result, Err(DataLabError::DimensionMismatch { .. })));
    }

    #[test]
    fn from_rows_pads_short_rows() {
        let df = DataFrame::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![Value::from(1.0), "x".into()], vec![Value::from(2.0)]],
        )
        .unwrap();
        assert_eq!(df.row_count(), 2);
        assert_eq!(df.row(1), vec![Value::from(2.0), Value::Null]);
    }

    #[test]
    fn from_rows_rejects_long_rows() {
        let result = DataFrame::from_rows(vec!["a".into()], &[vec![Value::from(1.0), Value::from(2.0)]]);
        assert!(result.is_err());
    }

    #[test]
    fn require_column_errors() {
        let df = DataFrame::from_rows(vec!["a".into()], &[vec![Value::from(1.0)]]).unwrap();
        assert!(matches!(
            df.require_column(""),
            Err(DataLabError::EmptySelection { .. })
        ));
        assert!(matches!(
            df.require_column("b"),
            Err(DataLabError::ColumnNotFound { .. })
        ));
        assert_eq!(df.require_column("a").unwrap().0, 0);
    }

    #[test]
    fn kind_partitions() {
        let df = DataFrame::from_rows(
            vec!["n".into(), "c".into(), "b".into()],
            &[vec![Value::from(1.0), "A".into(), true.into()]],
        )
        .unwrap();
        assert_eq!(df.numeric_columns(), vec!["n"]);
        assert_eq!(df.categorical_columns(), vec!["c"]);
        assert_eq!(df.schema()[2], ("b", ColumnKind::Other));
    }

    #[test]
    fn head_and_records() {
        let df = DataFrame::from_rows(
            vec!["region".into(), "sales".into()],
            &[
                vec!["A".into(), Value::from(10.0)],
                vec!["B".into(), Value::Null],
                vec!["C".into(), Value::from(1.0)],
            ],
        )
        .unwrap();
        let head = df.head(2);
        assert_eq!(head.row_count(), 2);
        let records = head.to_records();
        assert_eq!(records[0]["region"], serde_json::json!("A"));
        assert_eq!(records[1]["sales"], serde_json::Value::Null);
        assert_eq!(df.head(10).row_count(), 3);
    }

    #[test]
    fn to_rows_shape() {
        let df = DataFrame::from_rows(vec!["a".into()], &[vec![Value::from(1.0)], vec![Value::from(2.0)]])
            .unwrap();
        let (header, rows) = df.to_rows();
        assert_eq!(header, vec!["a"]);
        assert_eq!(rows, vec![vec![Value::from(1.0)], vec![Value::from(2.0)]]);
    }

    #[test]
    fn total_null_count() {
        let df = DataFrame::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![Value::Null, Value::from(1.0)], vec![Value::Null, Value::Null]],
        )
        .unwrap();
        assert_eq!(df.total_null_count(), 3);
    }
}
