//! Catalog queries.
//!
//! Every query is scoped by an optional schema (library) and, where it makes
//! sense, an optional table name. Scope values are always bound as
//! parameters. When no table is given the owning schema and table name are
//! selected as `TABLE_SCHEMA` and `NAME` so rows for many tables can be
//! grouped.

use crate::types::Value;

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates `WHERE` conditions and their parameters.
struct Conditions {
    clauses: Vec<&'static str>,
    params: Vec<Value>,
}

impl Conditions {
    fn new(fixed: &[&'static str]) -> Self {
        Self {
            clauses: fixed.to_vec(),
            params: Vec::new(),
        }
    }

    fn bind(&mut self, clause: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.clauses.push(clause);
            self.params.push(Value::from(value));
        }
    }

    fn finish(self, mut sql: String, order_by: &str) -> CatalogQuery {
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        if !order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        CatalogQuery {
            sql,
            params: self.params,
        }
    }
}

const TABLE_NAMES: &str = "SELECT NAME FROM QSYS2.SYSTABLES";

const TABLES: &str = "SELECT CREATOR AS TABLE_SCHEMA, NAME FROM QSYS2.SYSTABLES";

const SEQUENCES: &str = "SELECT SEQUENCE_NAME, INCREMENT AS INCREMENT_BY, START AS START_VALUE \
     FROM QSYS2.SYSSEQUENCES";

const SCHEMA_NAMES: &str = "SELECT SCHEMA_NAME FROM QSYS2.SYSSCHEMAS";

const COLUMNS: &str = r#"
       C.COLUMN_NAME,
       C.DATA_TYPE AS TYPENAME,
       C.CHARACTER_SET_NAME AS CODEPAGE,
       D.NULLABLE AS NULLS,
       D.COLUMN_SIZE AS LENGTH,
       C.NUMERIC_SCALE AS SCALE,
       D.COLUMN_TEXT AS COMMENT,
       CASE
           WHEN C.IDENTITY_GENERATION IS NOT NULL THEN 1
           ELSE 0
       END AS AUTOINCREMENT,
       C.COLUMN_DEFAULT AS "DEFAULT"
  FROM SYSIBM.COLUMNS C
  JOIN QSYS2.TABLES AS T
    ON T.TABLE_SCHEMA = C.TABLE_SCHEMA
   AND T.TABLE_NAME = C.TABLE_NAME
  JOIN SYSIBM.SQLCOLUMNS AS D
    ON D.TABLE_SCHEM = C.TABLE_SCHEMA
   AND D.TABLE_NAME = C.TABLE_NAME
   AND D.COLUMN_NAME = C.COLUMN_NAME"#;

const INDEXES: &str = r#"
       IDX.INDEX_NAME AS KEY_NAME,
       IDXCOL.COLUMN_NAME AS COLUMN_NAME,
       CASE
           WHEN IDX.IS_UNIQUE = 'P' THEN 1
           ELSE 0
       END AS "PRIMARY",
       CASE
           WHEN IDX.IS_UNIQUE = 'D' THEN 1
           ELSE 0
       END AS NON_UNIQUE
  FROM QSYS2.SYSINDEXES AS IDX
  JOIN QSYS2.SYSTABLES AS T
    ON IDX.TABLE_SCHEMA = T.TABLE_SCHEMA
   AND IDX.TABLE_NAME = T.TABLE_NAME
  JOIN QSYS2.SYSKEYS AS IDXCOL
    ON IDX.INDEX_SCHEMA = IDXCOL.INDEX_SCHEMA
   AND IDX.INDEX_NAME = IDXCOL.INDEX_NAME"#;

const FOREIGN_KEYS: &str = r#"
       FKCOL.COLUMN_NAME AS LOCAL_COLUMN,
       P.TABLE_NAME AS FOREIGN_TABLE,
       PKCOL.COLUMN_NAME AS FOREIGN_COLUMN,
       R.CONSTRAINT_NAME AS INDEX_NAME,
       CASE
           WHEN C.UPDATE_RULE = 'R' THEN 'RESTRICT'
       END AS ON_UPDATE,
       CASE
           WHEN C.DELETE_RULE = 'C' THEN 'CASCADE'
           WHEN C.DELETE_RULE = 'N' THEN 'SET NULL'
           WHEN C.DELETE_RULE = 'R' THEN 'RESTRICT'
       END AS ON_DELETE
  FROM QSYS2.SYSCST AS R
  JOIN QSYS2.SYSREFCST AS S
    ON R.CONSTRAINT_SCHEMA = S.CONSTRAINT_SCHEMA
   AND R.CONSTRAINT_NAME = S.CONSTRAINT_NAME
  JOIN QSYS2.REF_CONSTRAINTS AS C
    ON C.CONSTRAINT_SCHEMA = R.CONSTRAINT_SCHEMA
   AND C.CONSTRAINT_NAME = R.CONSTRAINT_NAME
  JOIN QSYS2.TABLES AS T
    ON T.TABLE_SCHEMA = R.TABLE_SCHEMA
   AND T.TABLE_NAME = R.TABLE_NAME
  JOIN QSYS2.SYSCST AS P
    ON P.CONSTRAINT_SCHEMA = S.UNIQUE_CONSTRAINT_SCHEMA
   AND P.CONSTRAINT_NAME = S.UNIQUE_CONSTRAINT_NAME
  JOIN QSYS2.SYSKEYCST AS FKCOL
    ON FKCOL.CONSTRAINT_SCHEMA = R.CONSTRAINT_SCHEMA
   AND FKCOL.CONSTRAINT_NAME = R.CONSTRAINT_NAME
  JOIN QSYS2.SYSKEYCST AS PKCOL
    ON PKCOL.CONSTRAINT_SCHEMA = P.CONSTRAINT_SCHEMA
   AND PKCOL.CONSTRAINT_NAME = P.CONSTRAINT_NAME
   AND PKCOL.ORDINAL_POSITION = FKCOL.ORDINAL_POSITION"#;

const VIEWS: &str = "SELECT TABLE_NAME AS NAME, \
     'CREATE VIEW ' CONCAT TABLE_NAME CONCAT ' AS ' CONCAT VIEW_DEFINITION AS TEXT \
     FROM QSYS2.SYSVIEWS";

const TABLE_OPTIONS: &str = "SELECT NAME, REMARKS, CREATOR AS TABLE_SCHEMA FROM QSYS2.SYSTABLES";

/// Base tables owned by a schema.
pub fn table_names(database: Option<&str>) -> CatalogQuery {
    let mut conditions = Conditions::new(&["TYPE = 'T'"]);
    conditions.bind("CREATOR = ?", database);
    conditions.finish(TABLE_NAMES.to_string(), "NAME")
}

/// Base tables in scope with their owning schema.
pub fn tables(database: Option<&str>) -> CatalogQuery {
    let mut conditions = Conditions::new(&["TYPE = 'T'"]);
    conditions.bind("CREATOR = ?", database);
    conditions.finish(TABLES.to_string(), "NAME, CREATOR")
}

/// Columns of one table, or of every base table in scope.
pub fn table_columns(database: Option<&str>, table: Option<&str>) -> CatalogQuery {
    let mut sql = String::from("SELECT");
    if table.is_none() {
        sql.push_str(" C.TABLE_SCHEMA AS TABLE_SCHEMA, C.TABLE_NAME AS NAME,");
    }
    sql.push_str(COLUMNS);

    let mut conditions = Conditions::new(&["T.TABLE_TYPE = 'BASE TABLE'"]);
    conditions.bind("C.TABLE_SCHEMA = ?", database);
    conditions.bind("C.TABLE_NAME = ?", table);
    conditions.finish(sql, "C.TABLE_NAME, C.ORDINAL_POSITION")
}

/// Index key columns of one table, or of every table in scope.
pub fn index_columns(database: Option<&str>, table: Option<&str>) -> CatalogQuery {
    let mut sql = String::from("SELECT");
    if table.is_none() {
        sql.push_str(" IDX.TABLE_SCHEMA AS TABLE_SCHEMA, IDX.TABLE_NAME AS NAME,");
    }
    sql.push_str(INDEXES);

    let mut conditions = Conditions::new(&["T.TABLE_TYPE = 'T'"]);
    conditions.bind("IDX.TABLE_SCHEMA = ?", database);
    conditions.bind("IDX.TABLE_NAME = ?", table);
    conditions.finish(sql, "IDX.TABLE_NAME, IDX.INDEX_NAME, IDXCOL.ORDINAL_POSITION")
}

/// Foreign key column pairs of one table, or of every table in scope.
///
/// Local and referenced columns are matched on their ordinal position
/// within the constraint.
pub fn foreign_key_columns(database: Option<&str>, table: Option<&str>) -> CatalogQuery {
    let mut sql = String::from("SELECT");
    if table.is_none() {
        sql.push_str(" R.TABLE_SCHEMA AS TABLE_SCHEMA, R.TABLE_NAME AS NAME,");
    }
    sql.push_str(FOREIGN_KEYS);

    let mut conditions = Conditions::new(&["T.TABLE_TYPE = 'T'"]);
    conditions.bind("R.TABLE_SCHEMA = ?", database);
    conditions.bind("R.TABLE_NAME = ?", table);
    conditions.finish(
        sql,
        "R.TABLE_NAME, R.CONSTRAINT_NAME, FKCOL.ORDINAL_POSITION",
    )
}

/// Views in scope with their full definition text.
pub fn views(database: Option<&str>) -> CatalogQuery {
    let mut conditions = Conditions::new(&[]);
    conditions.bind("TABLE_SCHEMA = ?", database);
    conditions.finish(VIEWS.to_string(), "TABLE_NAME")
}

/// Table remarks, keyed by table name.
pub fn table_options(database: Option<&str>, table: Option<&str>) -> CatalogQuery {
    let mut conditions = Conditions::new(&[]);
    conditions.bind("CREATOR = ?", database);
    conditions.bind("NAME = ?", table);
    conditions.finish(TABLE_OPTIONS.to_string(), "")
}

/// Sequences in scope.
pub fn sequences(database: Option<&str>) -> CatalogQuery {
    let mut conditions = Conditions::new(&[]);
    conditions.bind("SEQUENCE_SCHEMA = ?", database);
    conditions.finish(SEQUENCES.to_string(), "SEQUENCE_NAME")
}

/// Every schema (library) on the server.
pub fn schema_names() -> CatalogQuery {
    Conditions::new(&[]).finish(SCHEMA_NAMES.to_string(), "SCHEMA_NAME")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_scoped() {
        let q = table_names(Some("MYLIB"));
        assert_eq!(
            q.sql,
            "SELECT NAME FROM QSYS2.SYSTABLES WHERE TYPE = 'T' AND CREATOR = ? ORDER BY NAME"
        );
        assert_eq!(q.params, vec![Value::from("MYLIB")]);
    }

    #[test]
    fn test_table_names_unscoped() {
        let q = table_names(None);
        assert_eq!(q.sql, "SELECT NAME FROM QSYS2.SYSTABLES WHERE TYPE = 'T' ORDER BY NAME");
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_columns_single_table() {
        let q = table_columns(Some("MYLIB"), Some("ORDERS"));
        assert!(!q.sql.contains("AS NAME,"));
        assert!(q.sql.ends_with(
            "WHERE T.TABLE_TYPE = 'BASE TABLE' AND C.TABLE_SCHEMA = ? AND C.TABLE_NAME = ? \
             ORDER BY C.TABLE_NAME, C.ORDINAL_POSITION"
        ));
        assert_eq!(q.params, vec![Value::from("MYLIB"), Value::from("ORDERS")]);
        // scope values are never interpolated
        assert!(!q.sql.contains("MYLIB"));
        assert!(!q.sql.contains("ORDERS"));
    }

    #[test]
    fn test_columns_all_tables_selects_name() {
        let q = table_columns(Some("MYLIB"), None);
        assert!(q.sql.starts_with("SELECT C.TABLE_SCHEMA AS TABLE_SCHEMA, C.TABLE_NAME AS NAME,"));
        assert_eq!(q.params.len(), 1);

        let q = index_columns(None, None);
        assert!(q.sql.starts_with("SELECT IDX.TABLE_SCHEMA AS TABLE_SCHEMA, IDX.TABLE_NAME AS NAME,"));
        let q = foreign_key_columns(None, None);
        assert!(q.sql.starts_with("SELECT R.TABLE_SCHEMA AS TABLE_SCHEMA, R.TABLE_NAME AS NAME,"));
    }

    #[test]
    fn test_tables_select_schema() {
        let q = tables(None);
        assert_eq!(
            q.sql,
            "SELECT CREATOR AS TABLE_SCHEMA, NAME FROM QSYS2.SYSTABLES WHERE TYPE = 'T' \
             ORDER BY NAME, CREATOR"
        );
        assert!(q.params.is_empty());
        assert_eq!(tables(Some("MYLIB")).params, vec![Value::from("MYLIB")]);
    }

    #[test]
    fn test_sequences_scoped() {
        let q = sequences(Some("MYLIB"));
        assert_eq!(
            q.sql,
            "SELECT SEQUENCE_NAME, INCREMENT AS INCREMENT_BY, START AS START_VALUE \
             FROM QSYS2.SYSSEQUENCES WHERE SEQUENCE_SCHEMA = ? ORDER BY SEQUENCE_NAME"
        );
        assert_eq!(q.params, vec![Value::from("MYLIB")]);
        assert!(!sequences(None).sql.contains("WHERE"));
    }

    #[test]
    fn test_schema_names() {
        let q = schema_names();
        assert_eq!(q.sql, "SELECT SCHEMA_NAME FROM QSYS2.SYSSCHEMAS ORDER BY SCHEMA_NAME");
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_indexes_ordered_by_key_position() {
        let q = index_columns(Some("MYLIB"), Some("ORDERS"));
        assert!(q.sql.contains("IDX.IS_UNIQUE = 'P'"));
        assert!(q.sql.contains("IDX.IS_UNIQUE = 'D'"));
        assert!(q.sql.ends_with("ORDER BY IDX.TABLE_NAME, IDX.INDEX_NAME, IDXCOL.ORDINAL_POSITION"));
    }

    #[test]
    fn test_foreign_keys_pair_by_ordinal() {
        let q = foreign_key_columns(None, Some("ORDERS"));
        assert!(q.sql.contains("PKCOL.ORDINAL_POSITION = FKCOL.ORDINAL_POSITION"));
        assert!(q.sql.contains("WHERE T.TABLE_TYPE = 'T' AND R.TABLE_NAME = ?"));
        assert_eq!(q.params, vec![Value::from("ORDERS")]);
    }

    #[test]
    fn test_table_options_unscoped_has_no_where() {
        let q = table_options(None, None);
        assert_eq!(q.sql, "SELECT NAME, REMARKS, CREATOR AS TABLE_SCHEMA FROM QSYS2.SYSTABLES");
        let q = table_options(Some("MYLIB"), Some("ORDERS"));
        assert_eq!(
            q.sql,
            "SELECT NAME, REMARKS, CREATOR AS TABLE_SCHEMA FROM QSYS2.SYSTABLES \
             WHERE CREATOR = ? AND NAME = ?"
        );
    }

    #[test]
    fn test_views_scoped() {
        let q = views(Some("MYLIB"));
        assert!(q.sql.contains("FROM QSYS2.SYSVIEWS WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME"));
    }
}
