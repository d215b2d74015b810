//! Portable schema model produced by catalog introspection.

use std::fmt;

/// Database-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Float,
    SmallFloat,
    Boolean,
    String,
    Text,
    Binary,
    Blob,
    Date,
    Time,
    DateTime,
}

impl LogicalType {
    /// Name of the type in the portable model.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::SmallInt => "smallint",
            LogicalType::Integer => "integer",
            LogicalType::BigInt => "bigint",
            LogicalType::Decimal => "decimal",
            LogicalType::Float => "float",
            LogicalType::SmallFloat => "smallfloat",
            LogicalType::Boolean => "boolean",
            LogicalType::String => "string",
            LogicalType::Text => "text",
            LogicalType::Binary => "binary",
            LogicalType::Blob => "blob",
            LogicalType::Date => "date",
            LogicalType::Time => "time",
            LogicalType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table column.
///
/// `length`, `precision` and `scale` are `None` when they do not apply to
/// the type, which is distinct from `Some(0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub logical_type: LogicalType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// Fixed width (CHAR rather than VARCHAR).
    pub fixed: bool,
    pub notnull: bool,
    pub autoincrement: bool,
    /// Default value with SQL quoting removed; `None` is a NULL default.
    pub default: Option<String>,
    pub comment: Option<String>,
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    /// Column names in key order.
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    Restrict,
    Cascade,
    SetNull,
    #[default]
    Unspecified,
}

impl ReferentialAction {
    /// Parse the action keyword produced by the catalog query.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("RESTRICT") => ReferentialAction::Restrict,
            Some(v) if v.eq_ignore_ascii_case("CASCADE") => ReferentialAction::Cascade,
            Some(v) if v.eq_ignore_ascii_case("SET NULL") => ReferentialAction::SetNull,
            _ => ReferentialAction::Unspecified,
        }
    }

    /// SQL keyword, if the action is specified.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            ReferentialAction::Restrict => Some("RESTRICT"),
            ReferentialAction::Cascade => Some("CASCADE"),
            ReferentialAction::SetNull => Some("SET NULL"),
            ReferentialAction::Unspecified => None,
        }
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    /// Referencing columns, in constraint order.
    pub local_columns: Vec<String>,
    pub foreign_table: String,
    /// Referenced columns, paired with `local_columns` by position.
    pub foreign_columns: Vec<String>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

/// A view and its defining query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub name: String,
    /// The SELECT body, without the `CREATE VIEW ... AS` prefix.
    pub sql: String,
}

/// Table level options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub comment: Option<String>,
}

/// A sequence object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    /// Increment between generated values.
    pub allocation_size: i64,
    pub initial_value: i64,
}

/// A fully introspected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Owning schema (library), when known.
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub options: TableOptions,
}

impl Table {
    /// Look up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The primary key index, if any.
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.primary)
    }
}
