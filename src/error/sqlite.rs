//! Mapping of raw SQLite driver errors onto [`StorageError`].

use rusqlite::ErrorCode;

use super::kinds::{ExtractorError, StorageError};

/// Classify a driver error raised while working on the database at `path`.
///
/// Failures with a well-known SQLite result code become the matching
/// [`StorageError`]; everything else is kept as a raw driver error.
pub fn classify_sqlite_error(err: rusqlite::Error, path: &str) -> ExtractorError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            let reason = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            match failure.code {
                ErrorCode::NotADatabase => StorageError::NotADatabase(path.to_string()).into(),
                ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure => StorageError::Open {
                    path: path.to_string(),
                    reason,
                }
                .into(),
                _ => StorageError::QueryFailed(reason).into(),
            }
        }
        rusqlite::Error::InvalidPath(p) => StorageError::Open {
            path: p.display().to_string(),
            reason: "invalid path".to_string(),
        }
        .into(),
        _ => ExtractorError::Sqlite(err),
    }
}
