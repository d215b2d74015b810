//! Prepared statements with deferred binding and LOB staging.
//!
//! Binding only records a snapshot of the value against its slot; the
//! parameter list is resolved when the statement executes. Large objects are
//! staged through temporary files: the native statement is bound to the file
//! path and the data is written into the file right before execution.

use crate::cursor::ResultCursor;
use crate::error::{Error, Result};
use crate::native::NativeStatement;
use crate::types::{FetchMode, LobSource, ParamSlot, ParameterType, Value};
use std::collections::BTreeMap;
use std::io::{self, Write};
use tempfile::NamedTempFile;

/// A LOB value waiting to be copied into its staging file.
struct StagedLob {
    source: LobSource,
    file: NamedTempFile,
}

impl StagedLob {
    fn create(source: LobSource) -> Result<Self> {
        let file = NamedTempFile::new()
            .map_err(|e| Error::io_staging("could not create temporary file", e))?;
        Ok(Self { source, file })
    }

    fn path_value(&self) -> Value {
        Value::String(self.file.path().to_string_lossy().into_owned())
    }

    /// Copy the source into the staging file.
    fn flush(&mut self) -> Result<()> {
        let target = self.file.as_file_mut();
        match &mut self.source {
            LobSource::Stream(reader) => {
                io::copy(reader, target).map_err(|e| {
                    Error::io_staging("could not copy source stream to temporary file", e)
                })?;
            }
            LobSource::Text(text) => target
                .write_all(text.as_bytes())
                .map_err(|e| Error::io_staging("could not write string to temporary file", e))?,
            LobSource::Bytes(bytes) => target
                .write_all(bytes)
                .map_err(|e| Error::io_staging("could not write bytes to temporary file", e))?,
        }
        target
            .flush()
            .map_err(|e| Error::io_staging("could not flush temporary file", e))
    }

    fn release(self, slot: &ParamSlot) {
        if let Err(e) = self.file.close() {
            log::warn!("Failed to remove LOB staging file for parameter {}: {}", slot, e);
        }
    }
}

/// A prepared statement.
///
/// Created by [`Connection::prepare`](crate::Connection::prepare). Values are
/// bound with [`bind_value`](Self::bind_value) or [`bind_lob`](Self::bind_lob)
/// and sent on [`execute`](Self::execute); the statement can be executed
/// again with fresh bindings.
pub struct PreparedStatement<S: NativeStatement> {
    /// Native statement handle.
    stmt: S,
    /// SQL text, kept for logging.
    sql: String,
    /// Recorded bindings, resolved in slot order at execute time.
    bindings: BTreeMap<ParamSlot, Value>,
    /// LOB parameters staged through temporary files.
    lobs: BTreeMap<ParamSlot, StagedLob>,
    /// Shape used by [`ResultCursor::fetch_default`].
    fetch_mode: FetchMode,
    /// Whether the last execute left a result that can be fetched.
    result: bool,
}

impl<S: NativeStatement> PreparedStatement<S> {
    pub(crate) fn new(stmt: S, sql: impl Into<String>) -> Self {
        Self {
            stmt,
            sql: sql.into(),
            bindings: BTreeMap::new(),
            lobs: BTreeMap::new(),
            fetch_mode: FetchMode::default(),
            result: false,
        }
    }

    /// SQL text of this statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind a value to a parameter marker.
    ///
    /// Integers keep their numeric marker, large objects are routed through
    /// [`bind_lob`](Self::bind_lob) and everything else is bound with the
    /// text marker. Binary values keep their bytes.
    pub fn bind_value(
        &mut self,
        slot: impl Into<ParamSlot>,
        value: impl Into<Value>,
        kind: ParameterType,
    ) -> Result<()> {
        let slot = slot.into();
        let value = value.into();
        match kind {
            ParameterType::Integer => self.bind(slot, value, ParameterType::Integer),
            ParameterType::LargeObject => match value {
                // A NULL LOB is bound directly; there is nothing to stage.
                Value::Null => self.bind(slot, Value::Null, ParameterType::String),
                Value::Binary(bytes) => self.bind_lob(slot, LobSource::Bytes(bytes)),
                other => self.bind_lob(slot, LobSource::Text(other.to_text().unwrap_or_default())),
            },
            _ => {
                // Raw bytes and NULL go through untouched.
                let value = match value {
                    Value::Binary(_) | Value::Null => value,
                    other => Value::from(other.to_text()),
                };
                self.bind(slot, value, ParameterType::String)
            }
        }
    }

    /// Bind a large object.
    ///
    /// Any file previously staged for the slot is released first. A fresh
    /// temporary file is created and its path is bound in place of the data;
    /// the data itself is copied in at execute time.
    pub fn bind_lob(
        &mut self,
        slot: impl Into<ParamSlot>,
        source: impl Into<LobSource>,
    ) -> Result<()> {
        let slot = slot.into();
        if let Some(previous) = self.lobs.remove(&slot) {
            previous.release(&slot);
        }

        let staged = StagedLob::create(source.into())?;
        self.bind(slot.clone(), staged.path_value(), ParameterType::LargeObject)?;
        self.lobs.insert(slot, staged);
        Ok(())
    }

    fn bind(&mut self, slot: ParamSlot, value: Value, kind: ParameterType) -> Result<()> {
        self.stmt
            .bind_param(&slot, &value, kind)
            .map_err(Error::statement)?;
        self.bindings.insert(slot, value);
        Ok(())
    }

    /// Execute with the recorded bindings, sent in slot order.
    pub fn execute(&mut self) -> Result<ResultCursor<'_, S>> {
        let params: Vec<Value> = std::mem::take(&mut self.bindings).into_values().collect();
        self.run(&params)
    }

    /// Execute with an explicit parameter list.
    ///
    /// The list takes precedence over recorded bindings, which are discarded.
    /// Staged LOBs are still flushed, since the native statement reads them
    /// from their files.
    pub fn execute_with(&mut self, params: &[Value]) -> Result<ResultCursor<'_, S>> {
        self.bindings.clear();
        self.run(params)
    }

    fn run(&mut self, params: &[Value]) -> Result<ResultCursor<'_, S>> {
        if self.result {
            self.result = false;
            if let Err(d) = self.stmt.close_cursor() {
                log::warn!("Failed to close previous cursor before re-execute: {}", d);
            }
        }

        // Taken up front: every staging file is dropped, and thereby closed,
        // on all exit paths below.
        let mut staged = std::mem::take(&mut self.lobs);
        for lob in staged.values_mut() {
            lob.flush()?;
        }

        log::trace!(
            "Executing statement: {} with {} params ({} staged LOBs)",
            self.sql,
            params.len(),
            staged.len()
        );
        let executed = self.stmt.execute(params);

        for (slot, lob) in staged {
            lob.release(&slot);
        }

        executed.map_err(Error::statement)?;
        self.result = true;
        Ok(ResultCursor::new(self))
    }

    /// Close the cursor and discard recorded bindings.
    ///
    /// Returns `false` if the native client could not close the cursor.
    pub fn close_cursor(&mut self) -> bool {
        self.bindings.clear();
        if let Err(d) = self.stmt.close_cursor() {
            log::warn!("Failed to close cursor: {}", d);
            return false;
        }
        self.result = false;
        true
    }

    /// Set the default fetch mode for cursors produced by this statement.
    pub fn set_fetch_mode(&mut self, mode: FetchMode) {
        self.fetch_mode = mode;
    }

    /// Default fetch mode.
    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Rows affected by the last execute.
    pub fn row_count(&self) -> u64 {
        self.stmt.row_count()
    }

    /// Number of result columns.
    pub fn column_count(&self) -> usize {
        self.stmt.column_count()
    }

    /// Number of recorded bindings waiting for execute.
    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of LOB staging files currently open.
    pub fn staged_lob_count(&self) -> usize {
        self.lobs.len()
    }

    pub(crate) fn has_pending_result(&self) -> bool {
        self.result
    }

    pub(crate) fn clear_pending_result(&mut self) {
        self.result = false;
    }

    pub(crate) fn native(&self) -> &S {
        &self.stmt
    }

    pub(crate) fn native_mut(&mut self) -> &mut S {
        &mut self.stmt
    }
}
