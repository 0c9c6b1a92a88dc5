use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};

/// Rows of text cells under key fields followed by value fields.
///
/// Every row holds `key_fields.len() + fields.len()` cells. The key cells
/// of a row identify it; uniqueness is not enforced, duplicates are
/// reported when diffing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub key_fields: Vec<String>,
    pub fields: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(key_fields: Vec<String>, fields: Vec<String>) -> Self {
        Self {
            key_fields,
            fields,
            rows: Vec::new(),
        }
    }

    /// Number of cells per row.
    pub fn width(&self) -> usize {
        self.key_fields.len() + self.fields.len()
    }

    /// Append a row, checking its length.
    pub fn push_row(&mut self, row: Vec<String>) -> TableResult<()> {
        if row.len() != self.width() {
            return Err(TableError::RowLength {
                row: self.rows.len(),
                expected: self.width(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Key fields then value fields.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.key_fields.iter().chain(&self.fields).map(String::as_str)
    }

    /// Cell position of a field.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns().position(|c| c == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key_fields.iter().any(|k| k == name)
    }

    /// Cell of `row` under field `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let column = self.column(name)?;
        self.rows.get(row).map(|r| r[column].as_str())
    }
}
