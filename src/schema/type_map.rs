//! Mapping from Db2 for i catalog type names to portable types.

use super::model::LogicalType;
use crate::error::{Error, Result};

/// Resolve a catalog `DATA_TYPE` name.
///
/// Matching is case-insensitive and ignores padding.
pub fn logical_type(type_name: &str) -> Result<LogicalType> {
    let normalized = type_name.trim().to_ascii_lowercase();
    let logical = match normalized.as_str() {
        "smallint" => LogicalType::SmallInt,
        "integer" | "int" => LogicalType::Integer,
        "bigint" => LogicalType::BigInt,
        "decimal" | "numeric" | "decfloat" => LogicalType::Decimal,
        "double" | "float" => LogicalType::Float,
        "real" => LogicalType::SmallFloat,
        "boolean" => LogicalType::Boolean,
        "character" | "char" | "varchar" | "graphic" | "vargraphic" | "nchar" | "nvarchar" => {
            LogicalType::String
        }
        "clob" | "dbclob" | "nclob" | "xml" => LogicalType::Text,
        "binary" | "varbinary" => LogicalType::Binary,
        "blob" => LogicalType::Blob,
        "date" => LogicalType::Date,
        "time" => LogicalType::Time,
        "timestamp" | "timestmp" => LogicalType::DateTime,
        _ => {
            return Err(Error::UnknownColumnType {
                type_name: type_name.trim().to_string(),
            })
        }
    };
    Ok(logical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(logical_type("INTEGER").unwrap(), LogicalType::Integer);
        assert_eq!(logical_type("VARCHAR   ").unwrap(), LogicalType::String);
        assert_eq!(logical_type("character").unwrap(), LogicalType::String);
        assert_eq!(logical_type("CLOB").unwrap(), LogicalType::Text);
        assert_eq!(logical_type("TIMESTMP").unwrap(), LogicalType::DateTime);
        assert_eq!(logical_type("DECIMAL").unwrap(), LogicalType::Decimal);
    }

    #[test]
    fn test_unknown_type() {
        match logical_type("ROWID") {
            Err(Error::UnknownColumnType { type_name }) => assert_eq!(type_name, "ROWID"),
            other => panic!("Expected UnknownColumnType, got {:?}", other),
        }
    }
}
