//! Scripted native client for integration tests.
//!
//! Records everything the adapter sends and answers queries from canned
//! results matched by SQL substring.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use ibmi_db2::native::{NativeConnection, NativeDriver, NativeResult, NativeStatement};
use ibmi_db2::{ConnectionParams, Diagnostics, ParamSlot, ParameterType, Value};

/// A canned result set.
#[derive(Debug, Clone, Default)]
pub struct Canned {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: u64,
}

impl Canned {
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len() as u64;
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            row_count,
        }
    }

    /// A statement without a result set affecting `row_count` rows.
    pub fn affected(row_count: u64) -> Self {
        Self {
            row_count,
            ..Self::default()
        }
    }
}

/// One native execute call.
#[derive(Debug, Clone)]
pub struct Execution {
    pub sql: String,
    pub params: Vec<Value>,
    /// Content of every LOB staging file, read during the execute call.
    pub lobs: BTreeMap<ParamSlot, Vec<u8>>,
    /// Paths of the staging files.
    pub lob_paths: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub connection_strings: Vec<String>,
    pub connected_params: Vec<ConnectionParams>,
    pub prepared: Vec<String>,
    pub binds: Vec<(ParamSlot, Value, ParameterType)>,
    pub executions: Vec<Execution>,
    pub direct: Vec<String>,
    pub cursor_closes: usize,
    pub transactions: Vec<&'static str>,
    pub canned: Vec<(String, Canned)>,
    pub last_insert_id: Option<String>,
    pub server_version: Option<String>,
    pub fail_connect: Option<Diagnostics>,
    pub fail_prepare: Option<Diagnostics>,
    pub fail_execute: Option<Diagnostics>,
    pub fail_fetch: Option<Diagnostics>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
}

/// Native driver backed by shared, inspectable state.
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any SQL containing `pattern` with `canned`.
    pub fn on(&self, pattern: &str, canned: Canned) -> &Self {
        self.state
            .borrow_mut()
            .canned
            .push((pattern.to_string(), canned));
        self
    }

    pub fn state(&self) -> std::cell::RefMut<'_, FakeState> {
        self.state.borrow_mut()
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.state.borrow().executions.clone()
    }

    pub fn last_execution(&self) -> Execution {
        self.state
            .borrow()
            .executions
            .last()
            .cloned()
            .expect("no execution recorded")
    }
}

impl NativeDriver for FakeDriver {
    type Connection = FakeConnection;

    fn connect(
        &self,
        connection_string: &str,
        params: &ConnectionParams,
    ) -> NativeResult<FakeConnection> {
        let mut state = self.state.borrow_mut();
        if let Some(d) = state.fail_connect.clone() {
            return Err(d);
        }
        state.connection_strings.push(connection_string.to_string());
        state.connected_params.push(params.clone());
        Ok(FakeConnection {
            state: self.state.clone(),
        })
    }
}

pub struct FakeConnection {
    state: Rc<RefCell<FakeState>>,
}

impl NativeConnection for FakeConnection {
    type Statement = FakeStatement;

    fn prepare(&mut self, sql: &str) -> NativeResult<FakeStatement> {
        let mut state = self.state.borrow_mut();
        if let Some(d) = state.fail_prepare.clone() {
            return Err(d);
        }
        state.prepared.push(sql.to_string());
        Ok(FakeStatement {
            state: self.state.clone(),
            sql: sql.to_string(),
            lob_paths: BTreeMap::new(),
            columns: Vec::new(),
            rows: VecDeque::new(),
            row_count: 0,
        })
    }

    fn exec(&mut self, sql: &str) -> NativeResult<u64> {
        let mut state = self.state.borrow_mut();
        state.direct.push(sql.to_string());
        Ok(lookup(&state.canned, sql).map_or(0, |c| c.row_count))
    }

    fn begin_transaction(&mut self) -> NativeResult<()> {
        self.state.borrow_mut().transactions.push("begin");
        Ok(())
    }

    fn commit(&mut self) -> NativeResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_commit {
            return Err(Diagnostics::new("08003", -900, "connection does not exist"));
        }
        state.transactions.push("commit");
        Ok(())
    }

    fn rollback(&mut self) -> NativeResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_rollback {
            return Err(Diagnostics::new("08003", -900, "connection does not exist"));
        }
        state.transactions.push("rollback");
        Ok(())
    }

    fn last_insert_id(&mut self) -> NativeResult<Option<String>> {
        Ok(self.state.borrow().last_insert_id.clone())
    }

    fn server_version(&self) -> Option<String> {
        self.state.borrow().server_version.clone()
    }
}

pub struct FakeStatement {
    state: Rc<RefCell<FakeState>>,
    sql: String,
    lob_paths: BTreeMap<ParamSlot, PathBuf>,
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    row_count: u64,
}

fn lookup<'a>(canned: &'a [(String, Canned)], sql: &str) -> Option<&'a Canned> {
    canned
        .iter()
        .find(|(pattern, _)| sql.contains(pattern.as_str()))
        .map(|(_, c)| c)
}

impl NativeStatement for FakeStatement {
    fn bind_param(
        &mut self,
        slot: &ParamSlot,
        value: &Value,
        kind: ParameterType,
    ) -> NativeResult<()> {
        if kind == ParameterType::LargeObject {
            let path = value.as_str().map(PathBuf::from).unwrap_or_default();
            self.lob_paths.insert(slot.clone(), path);
        } else {
            self.lob_paths.remove(slot);
        }
        self.state
            .borrow_mut()
            .binds
            .push((slot.clone(), value.clone(), kind));
        Ok(())
    }

    fn execute(&mut self, params: &[Value]) -> NativeResult<()> {
        let mut state = self.state.borrow_mut();
        if let Some(d) = state.fail_execute.clone() {
            return Err(d);
        }

        let lobs = self
            .lob_paths
            .iter()
            .map(|(slot, path)| (slot.clone(), std::fs::read(path).unwrap_or_default()))
            .collect();
        state.executions.push(Execution {
            sql: self.sql.clone(),
            params: params.to_vec(),
            lobs,
            lob_paths: self.lob_paths.values().cloned().collect(),
        });

        let canned = lookup(&state.canned, &self.sql).cloned().unwrap_or_default();
        self.columns = canned.columns;
        self.rows = canned.rows.into();
        self.row_count = canned.row_count;
        Ok(())
    }

    fn fetch(&mut self) -> NativeResult<Vec<Value>> {
        if let Some(d) = self.state.borrow().fail_fetch.clone() {
            return Err(d);
        }
        self.rows.pop_front().ok_or_else(Diagnostics::no_data)
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn close_cursor(&mut self) -> NativeResult<()> {
        self.rows.clear();
        self.state.borrow_mut().cursor_closes += 1;
        Ok(())
    }
}

/// Shorthand for a text value.
pub fn s(v: &str) -> Value {
    Value::from(v)
}

/// Shorthand for an integer value.
pub fn i(v: i64) -> Value {
    Value::Integer(v)
}
