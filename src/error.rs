//! Error types for the IBM i Db2 adapter.

use std::io;
use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE reported by the native client when a cursor has no more rows.
pub const SQLSTATE_NO_DATA: &str = "02000";

/// Diagnostic record reported by the native client.
///
/// Every native failure carries the same three fields: the five character
/// SQLSTATE, the vendor (SQLCODE) number and the message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SQLSTATE[{sql_state}] ({native_code}): {message}")]
pub struct Diagnostics {
    /// Five character SQLSTATE.
    pub sql_state: String,
    /// Vendor specific error code.
    pub native_code: i32,
    /// Message text.
    pub message: String,
}

impl Diagnostics {
    /// Create a diagnostic record.
    pub fn new(sql_state: impl Into<String>, native_code: i32, message: impl Into<String>) -> Self {
        Self {
            sql_state: sql_state.into(),
            native_code,
            message: message.into(),
        }
    }

    /// Diagnostic signalling the end of a result set.
    pub fn no_data() -> Self {
        Self::new(SQLSTATE_NO_DATA, 100, "No data")
    }

    /// Whether this record is the "no more data" sentinel rather than a failure.
    pub fn is_no_data(&self) -> bool {
        self.sql_state == SQLSTATE_NO_DATA
    }
}

/// Error type for adapter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The native client refused to open a session.
    #[error("Connection failed: {source}")]
    Connection {
        #[source]
        source: Diagnostics,
    },

    /// Prepare or execute failed.
    #[error("Statement failed: {source}")]
    Statement {
        #[source]
        source: Diagnostics,
    },

    /// A fetch returned an error other than "no more data".
    #[error("Fetch failed: {source}")]
    Fetch {
        #[source]
        source: Diagnostics,
    },

    /// Temporary LOB storage could not be created, written or copied into.
    #[error("LOB staging failed: {message}")]
    IoStaging {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The requested fetch shape is not implemented by the cursor.
    #[error("Fetch mode {mode} is not supported")]
    UnsupportedFetchMode { mode: i32 },

    /// The cursor was freed and can no longer be read.
    #[error("Cursor is closed")]
    CursorClosed,

    /// Connection parameters could not be interpreted.
    #[error("Invalid configuration for '{key}': {message}")]
    InvalidConfiguration { key: String, message: String },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// A catalog row lacks a field the normalizer requires.
    #[error("Catalog row is missing field '{field}'")]
    CatalogField { field: String },

    /// The catalog reported a type name with no portable mapping.
    #[error("Unknown column type: {type_name}")]
    UnknownColumnType { type_name: String },
}

impl Error {
    /// Wrap native diagnostics from a failed connect.
    pub fn connection(source: Diagnostics) -> Self {
        Self::Connection { source }
    }

    /// Wrap native diagnostics from a failed prepare/execute.
    pub fn statement(source: Diagnostics) -> Self {
        Self::Statement { source }
    }

    /// Wrap native diagnostics from a failed fetch.
    pub fn fetch(source: Diagnostics) -> Self {
        Self::Fetch { source }
    }

    /// Create a LOB staging error.
    pub fn io_staging(message: impl Into<String>, source: io::Error) -> Self {
        Self::IoStaging {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn invalid_configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a missing catalog field error.
    pub fn catalog_field(field: impl Into<String>) -> Self {
        Self::CatalogField {
            field: field.into(),
        }
    }

    /// Native diagnostics attached to this error, if any.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Connection { source } | Error::Statement { source } | Error::Fetch { source } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// SQLSTATE of the underlying native failure.
    pub fn sql_state(&self) -> Option<&str> {
        self.diagnostics().map(|d| d.sql_state.as_str())
    }

    /// Vendor code of the underlying native failure.
    pub fn native_code(&self) -> Option<i32> {
        self.diagnostics().map(|d| d.native_code)
    }
}
