//! Value enum for loosely-typed cell values

use std::cmp::Ordering;
use std::fmt;

/// A scalar cell value as delivered by the upstream table.
///
/// The upstream source is loosely typed: cells hold strings, numbers or
/// nothing. Values carry a total order so sorting never depends on implicit
/// coercions:
///
/// - `Null` sorts before every `Number`, which sorts before every `String`
/// - numbers compare by IEEE-754 total order
/// - strings compare by their native (byte-wise) ordering
///
/// # Example
///
/// ```
/// use sheetgrid_lib::model::Value;
///
/// assert!(Value::Null < Value::from(1.0));
/// assert!(Value::from(99.0) < Value::from("1"));
/// assert!(Value::from("apple") < Value::from("banana"));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
}

impl Value {
    /// The value used for blank cells.
    pub fn empty() -> Self {
        Value::String(String::new())
    }

    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for null and for the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Number(_) => false,
        }
    }

    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts an upstream JSON value into a cell value.
    ///
    /// Booleans keep their textual form and nested structures are carried as
    /// their JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::String(b.to_string()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => Value::String(n.to_string()),
            },
            serde_json::Value::String(s) => Value::String(s),
            other => Value::String(other.to_string()),
        }
    }

    /// Returns the integral form of a number if it round-trips through `i64`.
    pub(crate) fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => match self.as_integral() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            Value::String(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order_by_type_then_value() {
        let mut values = vec![
            Value::from("b"),
            Value::from(10.0),
            Value::Null,
            Value::from("a"),
            Value::from(-2.5),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(-2.5),
                Value::from(10.0),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn test_numbers_are_not_coerced_to_strings() {
        // "10" < "9" as text, 9 < 10 as numbers
        assert!(Value::from(9.0) < Value::from(10.0));
        assert!(Value::from("10") < Value::from("9"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42.0).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("x").to_string(), "x");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(serde_json::json!(true)), Value::from("true"));
        assert_eq!(Value::from_json(serde_json::json!(3)), Value::from(3.0));
        assert_eq!(Value::from_json(serde_json::json!("s")), Value::from("s"));
    }

    #[test]
    fn test_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::empty().is_blank());
        assert!(!Value::from(0.0).is_blank());
    }
}
