//! Db2 value types for parameters and query results.

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A single column or parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Integer value (SMALLINT, INTEGER, BIGINT).
    Integer(i64),
    /// Decimal value as string (preserves precision of DECIMAL/NUMERIC).
    Decimal(String),
    /// Floating point value (REAL, DOUBLE).
    Double(f64),
    /// Character value (CHAR, VARCHAR, CLOB, GRAPHIC).
    String(String),
    /// Binary value (BINARY, VARBINARY, BLOB, CHAR FOR BIT DATA).
    Binary(Bytes),
    /// DATE value.
    Date(NaiveDate),
    /// TIME value.
    Time(NaiveTime),
    /// TIMESTAMP value.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64.
    ///
    /// Character values are accepted when they hold a (space padded) integer,
    /// which is how several catalog views report numeric codes.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Decimal(s) | Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Decimal(s) | Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to get the value as a NaiveDateTime.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Text rendering used when a parameter is bound as character data.
    ///
    /// Returns `None` for NULL so the statement sends an SQL NULL rather than
    /// the string "NULL".
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Binary(b) => Some(String::from_utf8_lossy(b).into_owned()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Binary(b) => write!(f, "<BINARY: {} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Binary(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_null() {
        let val = Value::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(val.to_text(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_value_decimal() {
        let val = Value::Decimal("123.45".to_string());
        assert_eq!(val.as_str(), Some("123.45"));
        assert_eq!(val.to_i64(), None);
        assert_eq!(val.to_f64(), Some(123.45));
    }

    #[test]
    fn test_padded_character_code_parses() {
        assert_eq!(Value::from("0    ").to_i64(), Some(0));
        assert_eq!(Value::Integer(1).to_i64(), Some(1));
        assert_eq!(Value::from("N").to_i64(), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::from(42).to_text(), Some("42".to_string()));
        assert_eq!(Value::from(true).to_text(), Some("1".to_string()));
        assert_eq!(Value::from(b"abc".to_vec()).to_text(), Some("abc".to_string()));

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::from(date).to_text(), Some("2024-02-29".to_string()));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }
}
