//! CSV parser producing a [`DataFrame`](crate::dataframe::DataFrame).
//!
//! Works on already-decoded text; byte decoding and the encoding fallback
//! live in [`ingest`](crate::ingest).
//!
//! # Features
//!
//! - RFC 4180 compliant (quoted fields, escaped quotes, delimiters and
//!   newlines inside quotes, CRLF and CR line endings)
//! - Standard null markers recognized: empty, `NA`, `N/A`, `null`, `NULL`,
//!   `None`, `NaN`, `#N/A`, …
//! - Column kind inferred per column: numeric when every non-null field
//!   parses as a number, categorical otherwise
//! - Rows shorter than the header are padded with nulls; longer rows are
//!   an error
//!
//! # Example
//!
//! ```
//! use u_datalab::csv_parser::CsvParser;
//! use u_datalab::dataframe::ColumnKind;
//!
//! let csv = "region,sales\nA,10\nB,NA\n";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! assert_eq!(df.row_count(), 2);
//! assert_eq!(df.column(0).unwrap().kind(), ColumnKind::Categorical);
//! assert_eq!(df.column(1).unwrap().kind(), ColumnKind::Numeric);
//! assert_eq!(df.column(1).unwrap().null_count(), 1);
//! ```

use crate::dataframe::DataFrame;
use crate::error::{DataLabError, Result};
use crate::ingest::normalize_headers;
use crate::value::Value;

/// Standard null value markers recognized during parsing.
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", "NaN", "nan", "NAN", "#N/A",
    "#NA",
];

/// CSV parser configuration and entry point.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

/// A parsed record and the line it started on.
type RawRecord = (usize, Vec<String>);

impl CsvParser {
    /// Creates a parser with default settings (comma delimiter, header row, standard null markers).
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Sets the field delimiter (default: comma).
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Sets whether the first row is a header (default: true).
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Sets custom null markers (replaces defaults).
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Parses CSV text into a DataFrame.
    pub fn parse_str(&self, input: &str) -> Result<DataFrame> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let mut records = self.parse_raw(input).into_iter();
        let Some((first_line, first)) = records.next() else {
            return Ok(DataFrame::new());
        };

        let (headers, pending) = if self.has_header {
            (first, None)
        } else {
            let generated = (0..first.len()).map(|i| i.to_string()).collect();
            (generated, Some((first_line, first)))
        };
        let n_cols = headers.len();

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for (line, fields) in pending.into_iter().chain(records) {
            if fields.len() > n_cols {
                return Err(DataLabError::CsvParse {
                    line,
                    message: format!("expected {n_cols} fields, got {}", fields.len()),
                });
            }
            rows.push(fields.iter().map(|f| self.cell(f)).collect());
        }

        DataFrame::from_rows(normalize_headers(headers), &rows)
    }

    // ── Internal parsing ─────────────────────────────────────────

    /// Parses raw CSV text into records of string fields.
    ///
    /// Blank lines outside quotes are skipped. A line holding only
    /// delimiters, or a quoted empty field, is a record of empty fields.
    fn parse_raw(&self, input: &str) -> Vec<RawRecord> {
        let delim = self.delimiter as char;
        let mut rows: Vec<RawRecord> = Vec::new();
        let mut current_row: Vec<String> = Vec::new();
        let mut current_field = String::new();
        let mut in_quotes = false;
        let mut quoted = false;
        let mut line = 1usize;
        let mut row_start = 1usize;
        let mut chars = input.chars().peekable();

        let finish_row =
            |row: &mut Vec<String>, quoted: bool, start: usize, rows: &mut Vec<RawRecord>| {
                let blank = !quoted && row.len() == 1 && row[0].is_empty();
                if blank {
                    row.clear();
                } else {
                    rows.push((start, std::mem::take(row)));
                }
            };

        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current_field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    if c == '\n' || (c == '\r' && chars.peek() != Some(&'\n')) {
                        line += 1;
                    }
                    current_field.push(c);
                }
            } else if c == '"' && current_field.is_empty() {
                in_quotes = true;
                quoted = true;
            } else if c == delim {
                current_row.push(std::mem::take(&mut current_field));
            } else if c == '\n' || c == '\r' {
                // \r\n counts once
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                current_row.push(std::mem::take(&mut current_field));
                finish_row(&mut current_row, quoted, row_start, &mut rows);
                quoted = false;
                line += 1;
                row_start = line;
            } else {
                current_field.push(c);
            }
        }

        if quoted || !current_field.is_empty() || !current_row.is_empty() {
            current_row.push(current_field);
            finish_row(&mut current_row, quoted, row_start, &mut rows);
        }

        rows
    }

    /// Converts a raw field into a cell value.
    fn cell(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        if self.null_markers.iter().any(|m| m == trimmed) {
            Value::Null
        } else {
            Value::Text(trimmed.to_string())
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
