//! Row shapes returned by a result cursor.

use std::sync::Arc;

use super::column::ColumnInfo;
use super::value::Value;
use crate::error::{Error, Result};

/// A row of query results with positional and by-name access.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column values.
    values: Vec<Value>,
    /// Shared column information (reference counted).
    column_info: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with values and shared column info.
    pub fn new(values: Vec<Value>, column_info: Arc<ColumnInfo>) -> Self {
        Self {
            values,
            column_info,
        }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get value by column index, failing when the index is past the end.
    pub fn try_get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(Error::ColumnIndexOutOfBounds {
            index,
            count: self.values.len(),
        })
    }

    /// Get value by column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.column_info
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.column_info.column_names()
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Convert into a keyed record.
    pub fn into_record(self) -> Record {
        let entries = self
            .column_info
            .names
            .iter()
            .cloned()
            .zip(self.values)
            .collect();
        Record { entries }
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// A keyed row: column name to value, in result set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Build a record from `(name, value)` pairs.
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Value for `key`; exact match first, then case-insensitive.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| self.entries.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
            .map(|(_, v)| v)
    }

    /// Whether a key is present (exact match).
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rewrite every key to lower case.
    ///
    /// When two keys collapse onto the same lower-case name the later one
    /// wins, which matches how a keyed map would be rebuilt.
    pub fn into_lowercase_keys(self) -> Record {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(self.entries.len());
        for (key, value) in self.entries {
            let key = key.to_lowercase();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Record { entries }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_column_info() -> Arc<ColumnInfo> {
        Arc::new(ColumnInfo::new(vec!["NAME".to_string(), "VALUE".to_string()]))
    }

    #[test]
    fn test_row_access() {
        let row = Row::new(
            vec![Value::from("test"), Value::Integer(42)],
            make_test_column_info(),
        );

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some(&Value::String("test".to_string())));
        assert_eq!(row.get_by_name("value"), Some(&Value::Integer(42)));
        assert_eq!(row.get_by_name("VALUE"), row.get_by_name("value"));
        assert_eq!(row.try_get(1).unwrap(), &Value::Integer(42));
        assert!(matches!(
            row.try_get(2),
            Err(Error::ColumnIndexOutOfBounds { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_row_into_record_keeps_order() {
        let row = Row::new(
            vec![Value::from("test"), Value::Integer(42)],
            make_test_column_info(),
        );
        let record = row.into_record();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["NAME", "VALUE"]);
        assert_eq!(record.get("Value"), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_lowercase_keys() {
        let record: Record = vec![("Column_Name", Value::from("A")), ("TYPENAME", Value::from("INTEGER"))]
            .into_iter()
            .collect();
        let lower = record.into_lowercase_keys();
        assert!(lower.contains_key("column_name"));
        assert!(lower.contains_key("typename"));
        assert!(!lower.contains_key("TYPENAME"));
    }
}
