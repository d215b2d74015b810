//! Result set column information.

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    /// Column names in result set order.
    pub names: Vec<String>,
}

impl ColumnInfo {
    /// Create new column info from column names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get column name by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Find column index by name.
    ///
    /// An exact match wins; otherwise the first case-insensitive match is
    /// returned, since the server may report names in either case.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name).or_else(|| {
            self.names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
        })
    }
}
