use std::{fmt, io};

/// Crate-wide `Result` type using [`ExtractorError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Top-level error type for extractor operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ExtractorError {
    /// Source database errors (missing file, not a database, unknown table or field).
    Storage(StorageError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors, mostly from the output sink.
    Io(io::Error),

    /// SQLite driver errors that were not classified as a storage error.
    Sqlite(rusqlite::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised while opening or querying the source database.
#[derive(Debug)]
pub enum StorageError {
    /// Database file does not exist.
    NotFound(String),

    /// SQLite refused to open the file.
    Open { path: String, reason: String },

    /// The file exists but is not a SQLite database.
    NotADatabase(String),

    /// Named table does not exist.
    NoSuchTable(String),

    /// Named field is not a column of the table.
    NoSuchColumn { table: String, field: String },

    /// Identifier cannot be used in a query (empty or containing NUL).
    InvalidIdentifier(String),

    /// Query preparation or row fetch failed.
    QueryFailed(String),

    /// Closing the connection failed.
    CloseFailed(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorError::Storage(e) => write!(f, "Storage error: {e}"),
            ExtractorError::Config(e) => write!(f, "Configuration error: {e}"),
            ExtractorError::Io(e) => write!(f, "I/O error: {e}"),
            ExtractorError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            ExtractorError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(path) => write!(f, "Database file not found: {path}"),
            StorageError::Open { path, reason } => {
                write!(f, "Failed to open database {path}: {reason}")
            }
            StorageError::NotADatabase(path) => {
                write!(f, "File is not a SQLite database: {path}")
            }
            StorageError::NoSuchTable(table) => write!(f, "No such table: {table}"),
            StorageError::NoSuchColumn { table, field } => {
                write!(f, "No such field '{field}' in table '{table}'")
            }
            StorageError::InvalidIdentifier(name) => {
                write!(f, "Invalid table or field name: {name:?}")
            }
            StorageError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            StorageError::CloseFailed(msg) => write!(f, "Failed to close database: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ExtractorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractorError::Storage(e) => Some(e),
            ExtractorError::Config(e) => Some(e),
            ExtractorError::Io(e) => Some(e),
            ExtractorError::Sqlite(e) => Some(e),
            ExtractorError::Generic(_) => None,
        }
    }
}

impl std::error::Error for StorageError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to ExtractorError ========================= */

impl From<io::Error> for ExtractorError {
    fn from(err: io::Error) -> Self {
        ExtractorError::Io(err)
    }
}

impl From<rusqlite::Error> for ExtractorError {
    fn from(err: rusqlite::Error) -> Self {
        ExtractorError::Sqlite(err)
    }
}

impl From<StorageError> for ExtractorError {
    fn from(err: StorageError) -> Self {
        ExtractorError::Storage(err)
    }
}

impl From<ConfigError> for ExtractorError {
    fn from(err: ConfigError) -> Self {
        ExtractorError::Config(err)
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(err: toml::de::Error) -> Self {
        ExtractorError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for ExtractorError {
    fn from(err: toml::ser::Error) -> Self {
        ExtractorError::Config(ConfigError::Generic(format!(
            "Failed to serialize configuration: {err}"
        )))
    }
}

impl From<String> for ExtractorError {
    fn from(msg: String) -> Self {
        ExtractorError::Generic(msg)
    }
}

impl From<&str> for ExtractorError {
    fn from(msg: &str) -> Self {
        ExtractorError::Generic(msg.to_string())
    }
}

impl ExtractorError {
    /// Whether the error originates from the source database.
    pub fn is_storage(&self) -> bool {
        matches!(self, ExtractorError::Storage(_) | ExtractorError::Sqlite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err: ExtractorError = StorageError::NoSuchColumn {
            table: "FILE".to_string(),
            field: "sha3".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Storage error: No such field 'sha3' in table 'FILE'"
        );
        assert!(err.is_storage());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ExtractorError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ExtractorError::Io(_)));
        assert!(!err.is_storage());
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parse = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ExtractorError = parse.into();
        assert!(matches!(
            err,
            ExtractorError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_identifier_is_debug_quoted() {
        let err = StorageError::InvalidIdentifier(String::new());
        assert_eq!(err.to_string(), "Invalid table or field name: \"\"");
    }
}
