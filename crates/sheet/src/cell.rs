use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// Check if the value is the empty marker
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to get the value as an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            CellValue::String(s) => s.parse().ok(),
            CellValue::Null => None,
        }
    }

    /// Get the value as it is written to CSV
    #[must_use]
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Parse a CSV field into a `CellValue` with type inference
    /// Tries: null -> int -> float -> string
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }

        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Int(i);
        }

        // "inf" and "NaN" parse as f64 but would break row equality
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }

        CellValue::String(s.to_string())
    }

    /// Key used to compare whole rows for duplicate detection.
    ///
    /// Numbers compare by value: a whole float shares its key with the
    /// matching integer, and `-0.0` with `0`.
    pub(crate) fn key(&self) -> String {
        match self {
            CellValue::Null => "N".to_string(),
            CellValue::Int(i) => format!("I{i}"),
            CellValue::Float(f)
                if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) =>
            {
                format!("I{}", *f as i64)
            }
            CellValue::Float(f) => format!("F{f:?}"),
            CellValue::String(s) => format!("S{s}"),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Int(i) => write!(f, "{i}"),
            // Debug formatting keeps "1.0" so a reload infers Float again
            CellValue::Float(fl) => write!(f, "{fl:?}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_null() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse(" "), CellValue::String(" ".to_string()));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(CellValue::parse("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse("-123"), CellValue::Int(-123));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(CellValue::parse("2.5"), CellValue::Float(2.5));
        assert_eq!(CellValue::parse("-0.25"), CellValue::Float(-0.25));
    }

    #[test]
    fn test_parse_non_finite_is_string() {
        assert_eq!(CellValue::parse("NaN"), CellValue::String("NaN".to_string()));
        assert_eq!(CellValue::parse("inf"), CellValue::String("inf".to_string()));
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(
            CellValue::parse("hello"),
            CellValue::String("hello".to_string())
        );
    }

    #[test]
    fn test_display_keeps_float_type() {
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(
            CellValue::parse(&CellValue::Float(1e16).to_string()),
            CellValue::Float(1e16)
        );
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn test_key_distinguishes_text_from_numbers() {
        assert_ne!(CellValue::Int(1).key(), CellValue::String("1".to_string()).key());
        assert_ne!(CellValue::Null.key(), CellValue::String(String::new()).key());
    }

    #[test]
    fn test_key_compares_numbers_by_value() {
        assert_eq!(CellValue::Int(1).key(), CellValue::Float(1.0).key());
        assert_eq!(CellValue::Float(-0.0).key(), CellValue::Float(0.0).key());
        assert_eq!(CellValue::Float(-0.0).key(), CellValue::Int(0).key());
        assert_ne!(CellValue::Float(1.5).key(), CellValue::Int(1).key());
        assert_ne!(CellValue::Float(1e300).key(), CellValue::Int(i64::MAX).key());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Float(3.75).as_int(), Some(3));
        assert_eq!(CellValue::String("42".to_string()).as_int(), Some(42));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }
}
