//! File ingestion: bytes plus a declared extension in, [`DataFrame`] out.
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `csv` | [`CsvParser`] after text decoding (UTF-8, then GB18030) |
//! | `xlsx`, `xls` | calamine, first sheet unless configured otherwise |
//! | `json` | serde_json; records, columns or split layout |
//!
//! # Example
//!
//! ```
//! use u_datalab::ingest::ingest;
//!
//! let df = ingest(b"region,sales\nA,10\nB,5\n", "CSV").unwrap();
//! assert_eq!(df.row_count(), 2);
//!
//! let err = ingest(b"", "parquet").unwrap_err();
//! assert_eq!(err.to_string(), "unsupported file format: 'parquet'");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use calamine::{Data, Reader};
use encoding_rs::{Encoding, GB18030, UTF_8};
use tracing::{debug, info};

use crate::csv_parser::CsvParser;
use crate::dataframe::DataFrame;
use crate::error::{DataLabError, Result};
use crate::value::Value;

// ── FileFormat ────────────────────────────────────────────────────────

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Json,
}

impl FileFormat {
    /// Resolves a declared extension, case-insensitively and with or
    /// without a leading dot.
    ///
    /// ```
    /// use u_datalab::ingest::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_extension(".XLSX").unwrap(), FileFormat::Xlsx);
    /// assert!(FileFormat::from_extension("txt").is_err());
    /// ```
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "json" => Ok(Self::Json),
            _ => Err(DataLabError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Returns the canonical lowercase extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Json => "json",
        }
    }
}

impl FromStr for FileFormat {
    type Err = DataLabError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── IngestOptions ─────────────────────────────────────────────────────

/// Ingestion configuration.
///
/// Defaults: comma-delimited CSV with a header row, the standard null
/// markers, `[UTF-8, GB18030]` decode order, first worksheet.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    csv: CsvParser,
    encodings: Vec<&'static Encoding>,
    sheet: usize,
}

impl IngestOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            csv: CsvParser::new(),
            encodings: vec![UTF_8, GB18030],
            sheet: 0,
        }
    }

    /// Sets the CSV field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.csv = self.csv.delimiter(delim);
        self
    }

    /// Sets whether the first CSV row is a header (default: true).
    pub fn has_header(mut self, header: bool) -> Self {
        self.csv = self.csv.has_header(header);
        self
    }

    /// Sets custom CSV null markers (replaces defaults).
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.csv = self.csv.null_markers(markers);
        self
    }

    /// Sets the encodings tried, in order, when decoding CSV bytes.
    pub fn encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Sets the zero-based worksheet index read from workbooks (default: 0).
    pub fn sheet(mut self, index: usize) -> Self {
        self.sheet = index;
        self
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ── Entry points ──────────────────────────────────────────────────────

/// Parses `bytes` according to `extension` with default options.
pub fn ingest(bytes: &[u8], extension: &str) -> Result<DataFrame> {
    ingest_with(bytes, extension, &IngestOptions::default())
}

/// Parses `bytes` according to `extension`.
///
/// # Errors
///
/// - [`UnsupportedFormat`](DataLabError::UnsupportedFormat) for an unknown extension
/// - [`DecodeFailure`](DataLabError::DecodeFailure) when no configured encoding decodes a CSV
/// - [`CsvParse`](DataLabError::CsvParse), [`Json`](DataLabError::Json) or
///   [`Workbook`](DataLabError::Workbook) for malformed content
pub fn ingest_with(bytes: &[u8], extension: &str, options: &IngestOptions) -> Result<DataFrame> {
    let format = FileFormat::from_extension(extension)?;
    let df = match format {
        FileFormat::Csv => {
            let text = decode_text(bytes, &options.encodings)?;
            options.csv.parse_str(&text)?
        }
        FileFormat::Xlsx | FileFormat::Xls => read_workbook(bytes, options.sheet)?,
        FileFormat::Json => read_json(bytes)?,
    };
    debug!(
        %format,
        rows = df.row_count(),
        columns = df.column_count(),
        "ingested dataset"
    );
    Ok(df)
}

/// Decodes text with the first encoding in `encodings` that accepts the
/// bytes without replacement characters. A leading BOM is removed.
///
/// ```
/// use u_datalab::ingest::decode_text;
///
/// let bytes = encoding_rs::GB18030.encode("销售额").0;
/// let text = decode_text(&bytes, &[encoding_rs::UTF_8, encoding_rs::GB18030]).unwrap();
/// assert_eq!(text, "销售额");
/// ```
pub fn decode_text(bytes: &[u8], encodings: &[&'static Encoding]) -> Result<String> {
    for (attempt, encoding) in encodings.iter().enumerate() {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            if attempt > 0 {
                info!(encoding = encoding.name(), "decoded input with fallback encoding");
            }
            let text = text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string();
            return Ok(text);
        }
    }
    Err(DataLabError::DecodeFailure {
        attempted: encodings.iter().map(|e| e.name().to_string()).collect(),
    })
}

/// Makes header names unique: blanks become `Unnamed: {i}` and repeats
/// get `.1`, `.2`, … suffixes.
pub(crate) fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for (i, name) in headers.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        while seen.contains(&candidate) {
            let suffix = next_suffix.entry(base.clone()).or_insert(0);
            *suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ── Workbooks ─────────────────────────────────────────────────────────

fn read_workbook(bytes: &[u8], sheet: usize) -> Result<DataFrame> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(sheet)
        .ok_or_else(|| DataLabError::Workbook(format!("sheet index {sheet} out of range")))??;

    let grid: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    frame_from_grid(&grid)
}

/// Builds a frame from worksheet cells; the first row is the header.
fn frame_from_grid(grid: &[Vec<Data>]) -> Result<DataFrame> {
    let Some((header_row, body)) = grid.split_first() else {
        return Ok(DataFrame::new());
    };
    let headers = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty | Data::Error(_) => String::new(),
            other => other.to_string(),
        })
        .collect();
    let rows: Vec<Vec<Value>> = body
        .iter()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    DataFrame::from_rows(normalize_headers(headers), &rows)
}

fn workbook_cell(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}

// ── JSON ──────────────────────────────────────────────────────────────

fn read_json(bytes: &[u8]) -> Result<DataFrame> {
    let root: serde_json::Value = serde_json::from_slice(bytes)?;
    match root {
        serde_json::Value::Array(items) => json_array(items),
        serde_json::Value::Object(map) => {
            if let (Some(serde_json::Value::Array(columns)), Some(serde_json::Value::Array(data))) =
                (map.get("columns"), map.get("data"))
            {
                return json_split(columns, data);
            }
            json_columns(map)
        }
        other => Err(DataLabError::Json(format!(
            "expected an array or object at top level, got {}",
            json_type_name(&other)
        ))),
    }
}

/// `[{"a": 1}, {"a": 2, "b": "x"}]`, `[[1, "x"], …]` or `[1, 2, 3]`.
fn json_array(items: Vec<serde_json::Value>) -> Result<DataFrame> {
    if items.is_empty() {
        return Ok(DataFrame::new());
    }

    if items.iter().all(serde_json::Value::is_object) {
        let mut header: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for item in &items {
            if let serde_json::Value::Object(record) = item {
                for key in record.keys() {
                    if !positions.contains_key(key) {
                        positions.insert(key.clone(), header.len());
                        header.push(key.clone());
                    }
                }
            }
        }
        let rows: Vec<Vec<Value>> = items
            .iter()
            .map(|item| {
                header
                    .iter()
                    .map(|key| item.get(key).map_or(Value::Null, json_cell))
                    .collect()
            })
            .collect();
        return DataFrame::from_rows(normalize_headers(header), &rows);
    }

    if items.iter().all(serde_json::Value::is_array) {
        let width = items
            .iter()
            .filter_map(serde_json::Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let rows: Vec<Vec<Value>> = items
            .iter()
            .filter_map(serde_json::Value::as_array)
            .map(|row| row.iter().map(json_cell).collect())
            .collect();
        return DataFrame::from_rows((0..width).map(|i| i.to_string()).collect(), &rows);
    }

    let rows: Vec<Vec<Value>> = items.iter().map(|v| vec![json_cell(v)]).collect();
    DataFrame::from_rows(vec!["0".to_string()], &rows)
}

/// `{"columns": ["a", "b"], "data": [[1, "x"], [2, "y"]]}`.
fn json_split(columns: &[serde_json::Value], data: &[serde_json::Value]) -> Result<DataFrame> {
    let header: Vec<String> = columns.iter().map(json_label).collect();
    let rows = data
        .iter()
        .map(|row| match row {
            serde_json::Value::Array(cells) => Ok(cells.iter().map(json_cell).collect()),
            other => Err(DataLabError::Json(format!(
                "split layout rows must be arrays, got {}",
                json_type_name(other)
            ))),
        })
        .collect::<Result<Vec<Vec<Value>>>>()?;
    DataFrame::from_rows(normalize_headers(header), &rows)
}

/// `{"a": [1, 2], "b": {"0": "x", "1": "y"}}`.
///
/// Row labels are unioned across columns in first-seen order; array
/// columns use their positions as labels.
fn json_columns(map: serde_json::Map<String, serde_json::Value>) -> Result<DataFrame> {
    let mut labels: Vec<String> = Vec::new();
    let mut label_set: HashSet<String> = HashSet::new();
    let mut columns: Vec<(String, HashMap<String, Value>)> = Vec::with_capacity(map.len());

    for (name, column) in map {
        let cells: Vec<(String, Value)> = match &column {
            serde_json::Value::Array(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), json_cell(v)))
                .collect(),
            serde_json::Value::Object(by_label) => by_label
                .iter()
                .map(|(label, v)| (label.clone(), json_cell(v)))
                .collect(),
            other => {
                return Err(DataLabError::Json(format!(
                    "column '{name}' must be an array or object, got {}",
                    json_type_name(other)
                )))
            }
        };
        for (label, _) in &cells {
            if label_set.insert(label.clone()) {
                labels.push(label.clone());
            }
        }
        columns.push((name, cells.into_iter().collect()));
    }

    let header: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
    let rows: Vec<Vec<Value>> = labels
        .iter()
        .map(|label| {
            columns
                .iter()
                .map(|(_, cells)| cells.get(label).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    DataFrame::from_rows(normalize_headers(header), &rows)
}

fn json_cell(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        nested => Value::Text(nested.to_string()),
    }
}

fn json_label(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
