//! Scalar cell values.
//!
//! A [`Value`] is what a single cell holds when viewed row-wise: a number,
//! a string, a boolean, or null. Values are totally ordered and hashable so
//! they can serve as filter sets, group keys and mode candidates.
//!
//! # Ordering
//!
//! Numbers < booleans < text < null. Numbers compare with
//! [`f64::total_cmp`] after folding `-0.0` into `0.0`, text compares
//! lexicographically. Null sorting last matches how grouped output lists
//! the null group after every real key.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value. Never NaN; NaN inputs become [`Value::Null`] when a
    /// column is built.
    Number(f64),
    /// String value.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Interprets the value as a number.
    ///
    /// Text is parsed after trimming; booleans and null yield `None`.
    ///
    /// ```
    /// use u_datalab::value::Value;
    ///
    /// assert_eq!(Value::Number(2.5).as_f64(), Some(2.5));
    /// assert_eq!(Value::from(" 4 ").as_f64(), Some(4.0));
    /// assert_eq!(Value::from("four").as_f64(), None);
    /// ```
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Returns the string slice of a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to a `serde_json::Value` for record export.
    ///
    /// Non-finite numbers have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Bool(_) => 1,
            Self::Text(_) => 2,
            Self::Null => 3,
        }
    }
}

/// Folds `-0.0` into `0.0` so equal numbers hash and compare equal.
#[inline]
fn canonical(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Null, Self::Null) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Number(n) => canonical(*n).to_bits().hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Text(s) => s.hash(state),
            Self::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn null_sorts_last() {
        let mut values = vec![
            Value::Null,
            Value::from("b"),
            Value::from(3.0),
            Value::from("a"),
            Value::from(-1.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::from(-1.0),
                Value::from(3.0),
                Value::from("a"),
                Value::from("b"),
                Value::Null,
            ]
        );
    }

    #[test]
    fn negative_zero_equals_zero() {
        let mut set = HashSet::new();
        set.insert(Value::Number(0.0));
        assert!(set.contains(&Value::Number(-0.0)));
    }

    #[test]
    fn number_and_numeric_text_differ() {
        assert_ne!(Value::from(1.0), Value::from("1"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::from(10.0).to_string(), "10");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn json_conversion() {
        assert_eq!(Value::from(1.5).to_json(), serde_json::json!(1.5));
        assert_eq!(Value::from(f64::INFINITY).to_json(), serde_json::Value::Null);
        assert_eq!(Value::from("x").to_json(), serde_json::json!("x"));
    }

    #[test]
    fn deserialize_untagged() {
        let parsed: Vec<Value> = serde_json::from_str(r#"[null, true, 2, "A"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Value::Null, Value::Bool(true), Value::Number(2.0), Value::from("A")]
        );
    }
}
