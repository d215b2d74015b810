//! Fetch modes and the row shapes they produce.

use crate::error::Error;

use super::row::{Record, Row};
use super::value::Value;

/// Shape requested for each fetched row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Column name to value.
    #[default]
    Associative,
    /// Values by position.
    Numeric,
    /// Positional and by-name access on the same row.
    Both,
    /// A single column of each row (0-based index).
    Column(usize),
}

/// Driver-manager code for [`FetchMode::Associative`].
pub const FETCH_ASSOC: i32 = 2;
/// Driver-manager code for [`FetchMode::Numeric`].
pub const FETCH_NUM: i32 = 3;
/// Driver-manager code for [`FetchMode::Both`].
pub const FETCH_BOTH: i32 = 4;
/// Driver-manager code for [`FetchMode::Column`] (first column).
pub const FETCH_COLUMN: i32 = 7;

impl TryFrom<i32> for FetchMode {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            FETCH_ASSOC => Ok(FetchMode::Associative),
            FETCH_NUM => Ok(FetchMode::Numeric),
            FETCH_BOTH => Ok(FetchMode::Both),
            FETCH_COLUMN => Ok(FetchMode::Column(0)),
            mode => Err(Error::UnsupportedFetchMode { mode }),
        }
    }
}

/// One fetched row in the requested shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedRow {
    Numeric(Vec<Value>),
    Associative(Record),
    Column(Value),
    Both(Row),
}

impl FetchedRow {
    /// Shape a raw row according to `mode`.
    ///
    /// A column index past the end of the row yields NULL, like a missing
    /// key in a positional array.
    pub fn shape(row: Row, mode: FetchMode) -> Self {
        match mode {
            FetchMode::Numeric => FetchedRow::Numeric(row.into_iter().collect()),
            FetchMode::Associative => FetchedRow::Associative(row.into_record()),
            FetchMode::Both => FetchedRow::Both(row),
            FetchMode::Column(index) => {
                FetchedRow::Column(row.get(index).cloned().unwrap_or(Value::Null))
            }
        }
    }

    /// Positional values, if this is a numeric row.
    pub fn into_numeric(self) -> Option<Vec<Value>> {
        match self {
            FetchedRow::Numeric(values) => Some(values),
            FetchedRow::Both(row) => Some(row.into_iter().collect()),
            _ => None,
        }
    }

    /// Keyed record, if this is an associative row.
    pub fn into_record(self) -> Option<Record> {
        match self {
            FetchedRow::Associative(record) => Some(record),
            FetchedRow::Both(row) => Some(row.into_record()),
            _ => None,
        }
    }

    /// Scalar value, if this is a column fetch.
    pub fn into_value(self) -> Option<Value> {
        match self {
            FetchedRow::Column(value) => Some(value),
            _ => None,
        }
    }
}
