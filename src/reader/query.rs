//! Query specification for a single-column export.

use crate::error::{Result, StorageError};

/// Column names SQLite accepts on ordinary tables without listing them in
/// `table_info`.
const ROWID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// A `(table, field)` pair naming the column to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnQuery {
    pub table: String,
    pub field: String,
}

impl ColumnQuery {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Header line written before the values: the field name upper-cased.
    pub fn header(&self) -> String {
        self.field.to_uppercase()
    }

    /// `SELECT "field" FROM "table"` with both identifiers quoted.
    pub fn select_sql(&self) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {}",
            quote_identifier(&self.field)?,
            quote_identifier(&self.table)?
        ))
    }

    /// `SELECT count(*) FROM "table"`.
    pub fn count_sql(&self) -> Result<String> {
        Ok(format!(
            "SELECT count(*) FROM {}",
            quote_identifier(&self.table)?
        ))
    }

    /// Whether the field is one of SQLite's implicit rowid column names.
    pub fn is_rowid_alias(&self) -> bool {
        ROWID_ALIASES
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(&self.field))
    }
}

/// Quote an identifier for direct use in SQL text.
///
/// The name is wrapped in double quotes and embedded double quotes are
/// doubled, so any name (spaces, quotes, mixed case) resolves to exactly that
/// identifier and cannot change the shape of the statement.
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(StorageError::InvalidIdentifier(name.to_string()).into());
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
