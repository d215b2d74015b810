//! Db2 for IBM i adapter for Rust
//!
//! Connects a generic SQL layer to Db2 for IBM i through a native ODBC-style
//! client. The crate provides:
//!
//! - a connection adapter that builds the connection string and manages
//!   transactions
//! - prepared statements with deferred binding and LOB staging through
//!   temporary files
//! - result cursors with the usual fetch shapes
//! - catalog introspection into a portable schema model
//!
//! The native client is plugged in through the traits in [`native`].
//!
//! # Example
//!
//! ```no_run
//! use ibmi_db2::native::NativeDriver;
//! use ibmi_db2::{ConnectionParams, Driver, ParameterType, Result};
//!
//! fn report<D: NativeDriver>(client: D) -> Result<()> {
//!     let driver = Driver::new(client);
//!     let params = ConnectionParams::new("as400.example.com")
//!         .with_credentials("QUSER", "secret")
//!         .with_default_library("MYLIB");
//!     let mut conn = driver.connect(&params)?;
//!
//!     // Catalog introspection
//!     for table in conn.schema_manager().list_tables()? {
//!         println!("{} ({} columns)", table.name, table.columns.len());
//!     }
//!
//!     // Parameterized query
//!     let mut stmt = conn.prepare("SELECT NAME FROM ORDERS WHERE ID = ?")?;
//!     stmt.bind_value(1usize, 42, ParameterType::Integer)?;
//!     let mut cursor = stmt.execute()?;
//!     while let Some(record) = cursor.fetch_associative()? {
//!         println!("{:?}", record.get("NAME"));
//!     }
//!     cursor.free()?;
//!
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod cursor;
pub mod error;
pub mod native;
pub mod params;
pub mod schema;
pub mod statement;
pub mod types;

// Re-export main types
pub use connection::{Connection, Driver, QueryResult};
pub use cursor::ResultCursor;
pub use error::{Diagnostics, Error, Result};
pub use params::{ConnectionParams, DriverOptions, NamingMode};
pub use schema::{
    Column, ForeignKey, Index, LogicalType, ReferentialAction, SchemaManager, Sequence, Table,
    TableOptions, View,
};
pub use statement::PreparedStatement;
pub use types::{
    ColumnInfo, FetchMode, FetchedRow, LobSource, ParamSlot, ParameterType, Record, Row, Value,
    FETCH_ASSOC, FETCH_BOTH, FETCH_COLUMN, FETCH_NUM,
};
