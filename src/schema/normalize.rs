//! Normalization of raw catalog rows into the portable model.
//!
//! Key casing in catalog rows depends on the client and the naming mode, so
//! every row is lower-cased before any field is read.

use std::collections::BTreeMap;

use super::model::{
    Column, ForeignKey, Index, LogicalType, ReferentialAction, Sequence, TableOptions, View,
};
use super::type_map::logical_type;
use crate::error::{Error, Result};
use crate::types::{Record, Value};

static NULL: Value = Value::Null;

/// A catalog row with lower-case keys.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    record: Record,
}

impl CatalogRow {
    pub fn new(record: Record) -> Self {
        Self {
            record: record.into_lowercase_keys(),
        }
    }

    /// Raw value of a field; absent fields read as NULL.
    pub fn value(&self, field: &str) -> &Value {
        self.record.get(field).unwrap_or(&NULL)
    }

    /// Field rendered as text, `None` for NULL.
    pub fn text(&self, field: &str) -> Option<String> {
        self.value(field).to_text()
    }

    /// Identifier field with the catalog's fixed-width padding removed.
    pub fn ident(&self, field: &str) -> Result<String> {
        self.text(field)
            .map(|s| s.trim_end().to_string())
            .ok_or_else(|| Error::catalog_field(field))
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.value(field).to_i64()
    }

    /// Truthy integer flag (`1`, `'1'`); anything else is false.
    pub fn flag(&self, field: &str) -> bool {
        self.int(field).map_or(false, |v| v != 0)
    }

    fn has(&self, field: &str) -> bool {
        self.record.contains_key(field)
    }
}

impl From<Record> for CatalogRow {
    fn from(record: Record) -> Self {
        CatalogRow::new(record)
    }
}

/// Table name from a `NAME` row.
pub fn table_name(row: &CatalogRow) -> Result<String> {
    row.ident("name")
}

/// Owning schema and table name of a bulk row.
///
/// Rows without a `TABLE_SCHEMA` field key on the name alone.
pub fn table_key(row: &CatalogRow) -> Result<TableKey> {
    let schema = row.text("table_schema").map(|s| s.trim_end().to_string());
    Ok((schema, table_name(row)?))
}

/// Schema name from a `SCHEMA_NAME` row.
pub fn schema_name(row: &CatalogRow) -> Result<String> {
    row.ident("schema_name")
}

/// Build a sequence from one row of the sequences query.
///
/// Missing increment or start values read as 1.
pub fn sequence(row: &CatalogRow) -> Result<Sequence> {
    Ok(Sequence {
        name: row.ident("sequence_name")?,
        allocation_size: row.int("increment_by").unwrap_or(1),
        initial_value: row.int("start_value").unwrap_or(1),
    })
}

fn unquote_default(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

fn non_negative(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

/// Nullability code: `0` (no nulls) or `N` mean NOT NULL.
fn is_not_null(value: &Value) -> bool {
    match value {
        Value::Integer(v) => *v == 0,
        Value::String(s) | Value::Decimal(s) => {
            let s = s.trim();
            s == "0" || s.eq_ignore_ascii_case("N")
        }
        _ => false,
    }
}

/// Build a column from one row of the columns query.
pub fn column(row: &CatalogRow) -> Result<Column> {
    let name = if row.has("column_name") {
        row.ident("column_name")?
    } else {
        row.ident("colname")?
    };
    let type_name = row
        .text("typename")
        .ok_or_else(|| Error::catalog_field("typename"))?;
    let mut logical = logical_type(&type_name)?;

    let mut default = match row.value("default") {
        Value::Null => None,
        value => value
            .to_text()
            .filter(|d| d != "NULL")
            .map(|d| unquote_default(&d)),
    };

    let mut length = None;
    let mut precision = None;
    let mut scale = None;
    let mut fixed = false;

    let binary_codepage = row.int("codepage") == Some(0);
    match type_name.trim().to_ascii_lowercase().as_str() {
        "varchar" => {
            if binary_codepage {
                logical = LogicalType::Binary;
            }
            length = non_negative(row.int("length"));
        }
        "character" | "char" => {
            if binary_codepage {
                logical = LogicalType::Binary;
            }
            length = non_negative(row.int("length"));
            fixed = true;
        }
        "clob" => {
            length = non_negative(row.int("length"));
        }
        "decimal" | "numeric" | "double" | "real" => {
            let p = non_negative(row.int("length"));
            let s = non_negative(row.int("scale"));
            if p.is_some() && s.is_some() {
                precision = p;
                scale = s;
            }
        }
        _ => {}
    }

    let notnull = is_not_null(row.value("nulls"));
    // A NOT NULL column reports `""` or `"0"` when no default was declared.
    if notnull && matches!(default.as_deref(), Some("") | Some("0")) {
        default = None;
    }

    let comment = row
        .text("comment")
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(Column {
        name,
        logical_type: logical,
        length,
        precision,
        scale,
        fixed,
        notnull,
        autoincrement: row.flag("autoincrement"),
        default,
        comment,
    })
}

/// Group index key rows into indexes, keeping first-seen order.
pub fn indexes(rows: &[CatalogRow]) -> Result<Vec<Index>> {
    let mut result: Vec<Index> = Vec::new();
    for row in rows {
        let name = row.ident("key_name")?;
        let column = row.ident("column_name")?;
        match result.iter_mut().find(|i| i.name == name) {
            Some(index) => index.columns.push(column),
            None => {
                let primary = row.flag("primary");
                result.push(Index {
                    name,
                    columns: vec![column],
                    unique: primary || !row.flag("non_unique"),
                    primary,
                });
            }
        }
    }
    Ok(result)
}

/// Merge foreign key column rows sharing a constraint name.
///
/// Column pairs keep row order; the referenced table and actions come from
/// the first row of each constraint.
pub fn foreign_keys(rows: &[CatalogRow]) -> Result<Vec<ForeignKey>> {
    let mut result: Vec<ForeignKey> = Vec::new();
    for row in rows {
        let name = row.ident("index_name")?;
        let local = row.ident("local_column")?;
        let foreign = row.ident("foreign_column")?;
        match result.iter_mut().find(|fk| fk.name == name) {
            Some(fk) => {
                fk.local_columns.push(local);
                fk.foreign_columns.push(foreign);
            }
            None => result.push(ForeignKey {
                name,
                local_columns: vec![local],
                foreign_table: row.ident("foreign_table")?,
                foreign_columns: vec![foreign],
                on_update: ReferentialAction::parse(row.text("on_update").as_deref()),
                on_delete: ReferentialAction::parse(row.text("on_delete").as_deref()),
            }),
        }
    }
    Ok(result)
}

/// Body of a `CREATE VIEW name AS body` statement.
///
/// Returns an empty string when the text has no ` AS ` separator.
pub fn extract_view_body(text: &str) -> &str {
    let upper = text.to_ascii_uppercase();
    match upper.find(" AS ") {
        Some(pos) => &text[pos + 4..],
        None => "",
    }
}

/// Build a view from one row of the views query.
pub fn view(row: &CatalogRow) -> Result<View> {
    let name = row.ident("name")?;
    let text = row.text("text").unwrap_or_default();
    Ok(View {
        name,
        sql: extract_view_body(&text).to_string(),
    })
}

/// Table remarks keyed by table name.
pub fn table_options(rows: &[CatalogRow]) -> Result<BTreeMap<String, TableOptions>> {
    let mut options = BTreeMap::new();
    for row in rows {
        let name = row.ident("name")?;
        let comment = row
            .text("remarks")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        options.insert(name, TableOptions { comment });
    }
    Ok(options)
}

/// Key of a bulk row group: owning schema and table name.
pub type TableKey = (Option<String>, String);

/// Split bulk rows by schema and table name, keeping first-seen order.
///
/// Same-named tables in different schemas land in separate groups.
pub fn group_by_table(rows: Vec<CatalogRow>) -> Result<Vec<(TableKey, Vec<CatalogRow>)>> {
    let mut groups: Vec<(TableKey, Vec<CatalogRow>)> = Vec::new();
    for row in rows {
        let table = table_key(&row)?;
        match groups.iter_mut().find(|(key, _)| *key == table) {
            Some((_, group)) => group.push(row),
            None => groups.push((table, vec![row])),
        }
    }
    Ok(groups)
}
