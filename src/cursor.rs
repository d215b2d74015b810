//! Result cursor over an executed statement.
//!
//! A cursor borrows its statement mutably, so a statement has at most one
//! live cursor and cannot be re-executed while the cursor is in use.

use crate::error::{Error, Result};
use crate::native::NativeStatement;
use crate::statement::PreparedStatement;
use crate::types::{ColumnInfo, FetchMode, FetchedRow, Record, Row, Value};
use std::sync::Arc;

/// Rows produced by one execution of a prepared statement.
///
/// # Lifecycle
///
/// 1. Returned by [`PreparedStatement::execute`]
/// 2. Read via `fetch*` calls or by iterating
/// 3. Released via [`free`](Self::free) or by re-executing the statement
///
/// Fetching from a statement that produced no result set (an UPDATE, say)
/// yields `Ok(None)`, the same as an exhausted cursor.
pub struct ResultCursor<'stmt, S: NativeStatement> {
    /// Owning statement.
    stmt: &'stmt mut PreparedStatement<S>,
    /// Column names, resolved on first fetch.
    columns: Option<Arc<ColumnInfo>>,
    /// Set once `free()` has closed the native cursor.
    freed: bool,
    /// Rows fetched so far.
    rows_fetched: u64,
}

impl<'stmt, S: NativeStatement> ResultCursor<'stmt, S> {
    pub(crate) fn new(stmt: &'stmt mut PreparedStatement<S>) -> Self {
        Self {
            stmt,
            columns: None,
            freed: false,
            rows_fetched: 0,
        }
    }

    fn column_info(&mut self) -> Arc<ColumnInfo> {
        let stmt = &*self.stmt;
        self.columns
            .get_or_insert_with(|| Arc::new(ColumnInfo::new(stmt.native().column_names())))
            .clone()
    }

    /// Fetch the next raw row.
    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.freed {
            return Err(Error::CursorClosed);
        }
        if !self.stmt.has_pending_result() || self.stmt.native().column_count() == 0 {
            return Ok(None);
        }

        match self.stmt.native_mut().fetch() {
            Ok(values) => {
                let info = self.column_info();
                self.rows_fetched += 1;
                Ok(Some(Row::new(values, info)))
            }
            Err(d) if d.is_no_data() => Ok(None),
            Err(d) => Err(Error::fetch(d)),
        }
    }

    /// Fetch the next row in the given shape.
    ///
    /// Returns `Ok(None)` at the end of the result set.
    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>> {
        Ok(self.next_row()?.map(|row| FetchedRow::shape(row, mode)))
    }

    /// Fetch using the statement's default fetch mode.
    pub fn fetch_default(&mut self) -> Result<Option<FetchedRow>> {
        let mode = self.stmt.fetch_mode();
        self.fetch(mode)
    }

    /// Fetch using a numeric driver-manager fetch mode code.
    pub fn fetch_with_code(&mut self, code: i32) -> Result<Option<FetchedRow>> {
        let mode = FetchMode::try_from(code)?;
        self.fetch(mode)
    }

    /// Fetch the next row as positional values.
    pub fn fetch_numeric(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.next_row()?.map(|row| row.into_iter().collect()))
    }

    /// Fetch the next row as a keyed record.
    pub fn fetch_associative(&mut self) -> Result<Option<Record>> {
        Ok(self.next_row()?.map(Row::into_record))
    }

    /// Fetch one column of the next row; NULL if the index is past the end.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>> {
        Ok(self
            .next_row()?
            .map(|row| row.get(index).cloned().unwrap_or(Value::Null)))
    }

    /// Fetch the first column of the next row.
    pub fn fetch_one(&mut self) -> Result<Option<Value>> {
        self.fetch_column(0)
    }

    /// Fetch every remaining row in the given shape.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<FetchedRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch(mode)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fetch every remaining row with positional and by-name access.
    pub fn fetch_all_rows(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fetch every remaining row as positional values.
    pub fn fetch_all_numeric(&mut self) -> Result<Vec<Vec<Value>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_numeric()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fetch every remaining row as keyed records.
    pub fn fetch_all_associative(&mut self) -> Result<Vec<Record>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_associative()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fetch the first column of every remaining row.
    pub fn fetch_first_column(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(value) = self.fetch_one()? {
            values.push(value);
        }
        Ok(values)
    }

    /// Rows affected by the execute that produced this cursor.
    pub fn row_count(&self) -> u64 {
        self.stmt.row_count()
    }

    /// Number of result columns (0 when there is no result set).
    pub fn column_count(&self) -> usize {
        self.stmt.column_count()
    }

    /// Column names of the result set.
    pub fn column_names(&self) -> Vec<String> {
        match &self.columns {
            Some(info) => info.names.clone(),
            None => self.stmt.native().column_names(),
        }
    }

    /// Number of rows fetched so far.
    pub fn rows_fetched(&self) -> u64 {
        self.rows_fetched
    }

    /// Whether [`free`](Self::free) has been called.
    pub fn is_freed(&self) -> bool {
        self.freed
    }

    /// Close the native cursor.
    ///
    /// Further fetches fail with [`Error::CursorClosed`]. Calling `free`
    /// twice is a no-op.
    pub fn free(&mut self) -> Result<()> {
        if self.freed {
            return Ok(());
        }
        self.freed = true;
        self.stmt.clear_pending_result();
        self.stmt
            .native_mut()
            .close_cursor()
            .map_err(Error::statement)
    }
}

impl<S: NativeStatement> Iterator for ResultCursor<'_, S> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.freed {
            return None;
        }
        self.next_row().transpose()
    }
}
