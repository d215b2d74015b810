//! Catalog introspection.
//!
//! Each operation runs a read-only query against the Db2 for i catalog
//! views and normalizes the rows into the portable model in [`model`].
//! Queries are scoped to the connection's default library (`i5_lib`) unless
//! [`SchemaManager::with_database`] overrides it; with no scope at all they
//! cover every schema the user can see.

pub mod model;
pub mod normalize;
pub mod queries;
pub mod type_map;

use std::collections::BTreeMap;

pub use model::{
    Column, ForeignKey, Index, LogicalType, ReferentialAction, Sequence, Table, TableOptions, View,
};
pub use type_map::logical_type;

use crate::connection::Connection;
use crate::error::Result;
use crate::native::NativeConnection;
use normalize::{CatalogRow, TableKey};
use queries::CatalogQuery;

/// Schema introspection over a live connection.
pub struct SchemaManager<'conn, C: NativeConnection> {
    conn: &'conn mut Connection<C>,
    database: Option<String>,
}

impl<'conn, C: NativeConnection> SchemaManager<'conn, C> {
    /// Create a manager scoped to the connection's default library.
    pub fn new(conn: &'conn mut Connection<C>) -> Self {
        let database = conn.params().default_library().map(str::to_string);
        Self { conn, database }
    }

    /// Scope catalog queries to `database` instead of the default library.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Schema (library) the catalog queries are scoped to.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn select(&mut self, query: CatalogQuery) -> Result<Vec<CatalogRow>> {
        log::trace!("Catalog query: {}", query.sql);
        let result = self.conn.execute_query(&query.sql, &query.params)?;
        Ok(result.into_records().into_iter().map(CatalogRow::new).collect())
    }

    /// Names of the base tables in scope, in name order.
    pub fn list_table_names(&mut self) -> Result<Vec<String>> {
        let query = queries::table_names(self.database.as_deref());
        self.select(query)?
            .iter()
            .map(normalize::table_name)
            .collect()
    }

    /// Columns of a table, in ordinal order.
    pub fn list_table_columns(&mut self, table: &str) -> Result<Vec<Column>> {
        let table = normalize_name(table);
        let query = queries::table_columns(self.database.as_deref(), Some(&table));
        self.select(query)?.iter().map(normalize::column).collect()
    }

    /// Indexes of a table, including the primary key.
    pub fn list_table_indexes(&mut self, table: &str) -> Result<Vec<Index>> {
        let table = normalize_name(table);
        let query = queries::index_columns(self.database.as_deref(), Some(&table));
        normalize::indexes(&self.select(query)?)
    }

    /// Foreign keys declared on a table.
    pub fn list_table_foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        let table = normalize_name(table);
        let query = queries::foreign_key_columns(self.database.as_deref(), Some(&table));
        normalize::foreign_keys(&self.select(query)?)
    }

    /// Views in scope.
    pub fn list_views(&mut self) -> Result<Vec<View>> {
        let query = queries::views(self.database.as_deref());
        self.select(query)?.iter().map(normalize::view).collect()
    }

    /// Sequences in scope, in name order.
    pub fn list_sequences(&mut self) -> Result<Vec<Sequence>> {
        let query = queries::sequences(self.database.as_deref());
        self.select(query)?.iter().map(normalize::sequence).collect()
    }

    /// Every schema (library) on the server, regardless of scope.
    pub fn list_schema_names(&mut self) -> Result<Vec<String>> {
        self.select(queries::schema_names())?
            .iter()
            .map(normalize::schema_name)
            .collect()
    }

    /// Table options keyed by table name, for one table or for all of them.
    ///
    /// Without a scope, same-named tables from different libraries share
    /// one entry; [`list_tables`](Self::list_tables) keeps them apart.
    pub fn fetch_table_options(
        &mut self,
        table: Option<&str>,
    ) -> Result<BTreeMap<String, TableOptions>> {
        let table = table.map(normalize_name);
        let query = queries::table_options(self.database.as_deref(), table.as_deref());
        normalize::table_options(&self.select(query)?)
    }

    /// Introspect one table completely.
    pub fn introspect_table(&mut self, table: &str) -> Result<Table> {
        let name = normalize_name(table);
        log::trace!("Introspecting table {}", name);

        let columns = self.list_table_columns(&name)?;
        let indexes = self.list_table_indexes(&name)?;
        let foreign_keys = self.list_table_foreign_keys(&name)?;
        let options = self
            .fetch_table_options(Some(&name))?
            .remove(&name)
            .unwrap_or_default();

        Ok(Table {
            schema: self.database.clone(),
            name,
            columns,
            indexes,
            foreign_keys,
            options,
        })
    }

    /// Introspect every base table in scope.
    ///
    /// Runs one query per catalog for the whole scope and splits the rows
    /// by schema and table name rather than querying table by table, so
    /// same-named tables in different libraries stay separate.
    pub fn list_tables(&mut self) -> Result<Vec<Table>> {
        let database = self.database.clone();
        let database = database.as_deref();

        let keys = self
            .select(queries::tables(database))?
            .iter()
            .map(normalize::table_key)
            .collect::<Result<Vec<_>>>()?;
        let mut columns = self.select_grouped(queries::table_columns(database, None))?;
        let mut indexes = self.select_grouped(queries::index_columns(database, None))?;
        let mut foreign_keys = self.select_grouped(queries::foreign_key_columns(database, None))?;
        let mut options = self.select_grouped(queries::table_options(database, None))?;

        log::trace!("Introspected {} tables", keys.len());

        keys.into_iter()
            .map(|key| {
                let column_rows = columns.remove(&key).unwrap_or_default();
                let index_rows = indexes.remove(&key).unwrap_or_default();
                let fk_rows = foreign_keys.remove(&key).unwrap_or_default();
                let option_rows = options.remove(&key).unwrap_or_default();
                let (schema, name) = key;
                Ok(Table {
                    schema: schema.or_else(|| database.map(str::to_string)),
                    columns: column_rows
                        .iter()
                        .map(normalize::column)
                        .collect::<Result<_>>()?,
                    indexes: normalize::indexes(&index_rows)?,
                    foreign_keys: normalize::foreign_keys(&fk_rows)?,
                    options: normalize::table_options(&option_rows)?
                        .into_values()
                        .next()
                        .unwrap_or_default(),
                    name,
                })
            })
            .collect()
    }

    fn select_grouped(
        &mut self,
        query: CatalogQuery,
    ) -> Result<BTreeMap<TableKey, Vec<CatalogRow>>> {
        let rows = self.select(query)?;
        Ok(normalize::group_by_table(rows)?.into_iter().collect())
    }
}

/// Catalog form of a table name: upper case unless double-quoted, in which
/// case the quotes are removed and the case kept.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_uppercase()
    }
}
