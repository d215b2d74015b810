//! Native client seam.
//!
//! The adapter never talks to the wire itself. It drives an ODBC-style
//! client through these three traits, which mirror the handle hierarchy of
//! the native library: a driver opens connections, a connection prepares
//! statements, a statement binds, executes and fetches.
//!
//! All calls are blocking. Every failure is reported as [`Diagnostics`];
//! the adapter decides which of them are errors.

use crate::error::Diagnostics;
use crate::params::ConnectionParams;
use crate::types::{ParamSlot, ParameterType, Value};

/// Result type for native calls.
pub type NativeResult<T> = std::result::Result<T, Diagnostics>;

/// Entry point of the native client library.
pub trait NativeDriver {
    /// Connection handle type.
    type Connection: NativeConnection;

    /// Open a session.
    ///
    /// `connection_string` is the string built by
    /// [`ConnectionParams::build_connection_string`]; credentials, protocol
    /// and driver options are read from `params`.
    fn connect(
        &self,
        connection_string: &str,
        params: &ConnectionParams,
    ) -> NativeResult<Self::Connection>;
}

/// An open native session.
pub trait NativeConnection {
    /// Statement handle type.
    type Statement: NativeStatement;

    /// Prepare SQL text.
    fn prepare(&mut self, sql: &str) -> NativeResult<Self::Statement>;

    /// Execute SQL directly, returning the affected row count.
    fn exec(&mut self, sql: &str) -> NativeResult<u64>;

    /// Switch off autocommit and start a unit of work.
    fn begin_transaction(&mut self) -> NativeResult<()>;

    /// Commit the current unit of work.
    fn commit(&mut self) -> NativeResult<()>;

    /// Roll back the current unit of work.
    fn rollback(&mut self) -> NativeResult<()>;

    /// Last generated identity value, or `Ok(None)` when the client cannot
    /// report it.
    fn last_insert_id(&mut self) -> NativeResult<Option<String>> {
        Ok(None)
    }

    /// Server version string, when the client exposes one.
    fn server_version(&self) -> Option<String> {
        None
    }
}

/// A prepared native statement.
pub trait NativeStatement {
    /// Declare the type of a parameter marker.
    ///
    /// For [`ParameterType::LargeObject`] the value is the path of a file
    /// holding the data, which the client reads at execute time.
    fn bind_param(
        &mut self,
        slot: &ParamSlot,
        value: &Value,
        kind: ParameterType,
    ) -> NativeResult<()>;

    /// Execute with the given parameter values in marker order.
    fn execute(&mut self, params: &[Value]) -> NativeResult<()>;

    /// Fetch the next row.
    ///
    /// An exhausted cursor reports a diagnostic with SQLSTATE `02000`.
    fn fetch(&mut self) -> NativeResult<Vec<Value>>;

    /// Column names of the current result set (empty when there is none).
    fn column_names(&self) -> Vec<String>;

    /// Number of result columns; 0 when the last execute produced no result set.
    fn column_count(&self) -> usize {
        self.column_names().len()
    }

    /// Rows affected by the last execute.
    fn row_count(&self) -> u64;

    /// Close the open cursor, releasing server resources.
    fn close_cursor(&mut self) -> NativeResult<()>;
}
