//! Driver entry point and connection adapter.

use crate::error::{Error, Result};
use crate::native::{NativeConnection, NativeDriver};
use crate::params::{ConnectionParams, DEFAULT_PROTOCOL};
use crate::schema::SchemaManager;
use crate::statement::PreparedStatement;
use crate::types::{ParameterType, Record, Row, Value};

/// Result of a query execution.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names.
    pub columns: Vec<String>,
    /// Rows returned.
    pub rows: Vec<Row>,
    /// Row count reported by the native statement.
    pub row_count: u64,
}

impl QueryResult {
    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.as_str()).collect()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Convert every row into a keyed record.
    pub fn into_records(self) -> Vec<Record> {
        self.rows.into_iter().map(Row::into_record).collect()
    }
}

impl IntoIterator for QueryResult {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Driver handed to the driver manager.
///
/// Wraps a native client library and opens [`Connection`]s from
/// [`ConnectionParams`].
pub struct Driver<D: NativeDriver> {
    native: D,
}

impl<D: NativeDriver> Driver<D> {
    /// Name under which the driver registers.
    pub const NAME: &'static str = "ibmi_db2";

    /// Create a driver over a native client library.
    pub fn new(native: D) -> Self {
        Self { native }
    }

    /// Driver name.
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Open a connection.
    ///
    /// The protocol defaults to `TCPIP` when the parameters leave it unset.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ibmi_db2::{ConnectionParams, Driver};
    ///
    /// let driver = Driver::new(odbc_client);
    /// let params = ConnectionParams::new("as400.example.com")
    ///     .with_credentials("QUSER", "secret")
    ///     .with_default_library("MYLIB");
    /// let mut conn = driver.connect(&params)?;
    /// let tables = conn.schema_manager().list_table_names()?;
    /// ```
    pub fn connect(&self, params: &ConnectionParams) -> Result<Connection<D::Connection>> {
        let mut params = params.clone();
        if params.protocol.as_deref().map_or(true, str::is_empty) {
            params.protocol = Some(DEFAULT_PROTOCOL.to_string());
        }
        Connection::open(&self.native, params)
    }
}

/// A connection to an IBM i Db2 database.
pub struct Connection<C: NativeConnection> {
    /// Native session handle.
    conn: C,
    /// Parameters the session was opened with.
    params: ConnectionParams,
    /// Whether a unit of work is open.
    in_transaction: bool,
}

impl<C: NativeConnection> Connection<C> {
    /// Open a session through a native driver.
    pub fn open<D>(driver: &D, params: ConnectionParams) -> Result<Self>
    where
        D: NativeDriver<Connection = C>,
    {
        let connection_string = params.build_connection_string();
        log::debug!("Connecting with '{}'", connection_string);

        let conn = driver
            .connect(&connection_string, &params)
            .map_err(Error::connection)?;

        Ok(Self {
            conn,
            params,
            in_transaction: false,
        })
    }

    /// Parameters this connection was opened with.
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Server version reported by the native client.
    pub fn server_version(&self) -> Option<String> {
        self.conn.server_version()
    }

    /// Prepare a statement.
    pub fn prepare(&mut self, sql: &str) -> Result<PreparedStatement<C::Statement>> {
        log::debug!("Preparing: {}", sql);
        let stmt = self.conn.prepare(sql).map_err(Error::statement)?;
        Ok(PreparedStatement::new(stmt, sql))
    }

    /// Execute a statement directly, returning the affected row count.
    pub fn exec(&mut self, sql: &str) -> Result<u64> {
        log::trace!("Executing directly: {}", sql);
        self.conn.exec(sql).map_err(Error::statement)
    }

    /// Run a query and collect all rows.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.execute_query(sql, &[])
    }

    /// Run a parameterized query and collect all rows.
    ///
    /// Parameters are bound by position (integers with their numeric
    /// marker, everything else as text) and never interpolated into `sql`.
    pub fn execute_query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut stmt = self.prepare(sql)?;
        for (index, value) in params.iter().enumerate() {
            let kind = match value {
                Value::Integer(_) => ParameterType::Integer,
                Value::Null => ParameterType::Null,
                _ => ParameterType::String,
            };
            stmt.bind_value(index + 1, value.clone(), kind)?;
        }

        let mut cursor = stmt.execute()?;
        let rows = cursor.fetch_all_rows()?;
        let columns = cursor.column_names();
        let row_count = cursor.row_count();
        cursor.free()?;

        Ok(QueryResult {
            columns,
            rows,
            row_count,
        })
    }

    /// Quote a value for inclusion in SQL text.
    ///
    /// Integers pass through unchanged; anything else is wrapped in single
    /// quotes. No escaping is performed: callers must pass sanitized input.
    pub fn quote(&self, value: &str, kind: ParameterType) -> String {
        quote(value, kind)
    }

    /// Start a unit of work.
    pub fn begin_transaction(&mut self) -> Result<bool> {
        log::debug!("Beginning transaction");
        self.conn.begin_transaction().map_err(Error::statement)?;
        self.in_transaction = true;
        Ok(true)
    }

    /// Commit the current unit of work.
    ///
    /// Failures are reported as `false`, never as an error.
    pub fn commit(&mut self) -> bool {
        match self.conn.commit() {
            Ok(()) => {
                log::debug!("Committed transaction");
                self.in_transaction = false;
                true
            }
            Err(d) => {
                log::warn!("Commit failed: {}", d);
                false
            }
        }
    }

    /// Roll back the current unit of work.
    ///
    /// Failures are reported as `false`, never as an error.
    pub fn rollback(&mut self) -> bool {
        match self.conn.rollback() {
            Ok(()) => {
                log::debug!("Rolled back transaction");
                self.in_transaction = false;
                true
            }
            Err(d) => {
                log::warn!("Rollback failed: {}", d);
                false
            }
        }
    }

    /// Whether a unit of work is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Most recently generated identity value in this session.
    ///
    /// Falls back to querying `IDENTITY_VAL_LOCAL()` from the one-row
    /// `QSYS2.QSQPTABL` table when the native client cannot report it.
    pub fn last_insert_id(&mut self) -> Result<Option<String>> {
        if let Some(id) = self.conn.last_insert_id().map_err(Error::statement)? {
            return Ok(Some(id));
        }

        let sql = format!(
            "SELECT IDENTITY_VAL_LOCAL() AS INTEGER_COLUMN FROM {}",
            self.params.qualify("QSYS2", "QSQPTABL")
        );
        let result = self.query(&sql)?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.get_by_name("INTEGER_COLUMN"))
            .and_then(Value::to_text))
    }

    /// Separator between schema and object names (`/` under system naming).
    pub fn schema_separator(&self) -> char {
        self.params.schema_separator()
    }

    /// Catalog introspection for this connection.
    pub fn schema_manager(&mut self) -> SchemaManager<'_, C> {
        SchemaManager::new(self)
    }

    /// Native session handle, for code that talks to the client directly.
    ///
    /// The handle stays owned by this connection: do not close or tear it
    /// down, and do not leave a transaction open on it behind the adapter's
    /// back.
    pub fn native_handle(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Close the connection, rolling back any open unit of work.
    pub fn close(mut self) {
        if self.in_transaction {
            log::warn!("Closing connection with an open transaction, rolling back");
            self.rollback();
        }
    }
}

/// Quote a value: integers verbatim, everything else in single quotes.
pub fn quote(value: &str, kind: ParameterType) -> String {
    match kind {
        ParameterType::Integer => value.to_string(),
        _ => format!("'{}'", value),
    }
}
