//! Scalar column values as read from SQLite.

use std::borrow::Cow;
use std::fmt;

use rusqlite::types::ValueRef;

/// A single value of the exported column.
///
/// The variant follows the SQLite storage class of the stored value, which may
/// differ from row to row within the same column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    /// Render the value as one output line, using `null_text` for NULL.
    ///
    /// Blobs are rendered as lower-case hex so binary digests come out the
    /// same way as digests stored as text. Reals use Rust's shortest
    /// round-trip form (`1.0`, `1e20`).
    pub fn render<'a>(&'a self, null_text: &'a str) -> Cow<'a, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(null_text),
            FieldValue::Integer(i) => Cow::Owned(i.to_string()),
            FieldValue::Real(r) => Cow::Owned(format!("{r:?}")),
            FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Blob(b) => Cow::Owned(hex::encode(b)),
        }
    }

    /// SQLite storage class name, used in debug logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real(_) => "real",
            FieldValue::Text(_) => "text",
            FieldValue::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

impl From<ValueRef<'_>> for FieldValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => FieldValue::Null,
            ValueRef::Integer(i) => FieldValue::Integer(i),
            ValueRef::Real(r) => FieldValue::Real(r),
            // RDS text columns are ASCII, but nothing stops a database from
            // holding invalid UTF-8 in a TEXT cell.
            ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => FieldValue::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}
