//! A single cell of a semicolon-delimited simulator export.

use std::fmt;

/// One parsed cell.
///
/// The loaders do no type coercion beyond "numeric or not": a cell that
/// parses as `f64` becomes [`Value::Number`], an empty cell becomes
/// [`Value::Empty`], anything else is kept as trimmed text.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw cell.
    pub fn parse(raw: &str) -> Value {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Empty;
        }
        match s.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(s.to_owned()),
        }
    }

    /// `true` for [`Value::Empty`] and for a `NaN` number.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Numeric view of the cell.  Text is never coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The cell as a lookup key.
    ///
    /// Integral numbers render without a fractional part so that a run
    /// column holding `1` matches the configured run id `"1"`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Empty => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(format!("{n}")),
            Value::Text(s) => Some(s.clone()),
        }
    }

    /// Round a number to `places` decimals; other variants pass through.
    pub fn rounded(self, places: i32) -> Value {
        match self {
            Value::Number(n) => {
                let scale = 10f64.powi(places);
                Value::Number((n * scale).round() / scale)
            }
            other => other,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        if s.is_empty() { Value::Empty } else { Value::Text(s.to_owned()) }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        if s.is_empty() { Value::Empty } else { Value::Text(s) }
    }
}

impl fmt::Display for Value {
    /// Missing values render as an empty string, matching a blank
    /// spreadsheet cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) if n.is_nan() => Ok(()),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}
