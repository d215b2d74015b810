//! Value, row and parameter types.

mod column;
mod fetch;
mod param;
mod row;
mod value;

pub use column::ColumnInfo;
pub use fetch::{FetchMode, FetchedRow, FETCH_ASSOC, FETCH_BOTH, FETCH_COLUMN, FETCH_NUM};
pub use param::{LobSource, ParamSlot, ParameterType};
pub use row::{Record, Row};
pub use value::Value;
