//! Error handling module for the extractor.
//!
//! This module provides:
//! - A single top-level error type, [`ExtractorError`], used across the crate
//! - Storage errors for everything that goes wrong on the SQLite side
//! - Configuration errors for the TOML config layer
//! - Classification of raw SQLite driver errors into storage errors
//!
//! # Example
//!
//! ```rust,no_run
//! use nsrl_extract::error::{ExtractorError, Result, StorageError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(StorageError::NoSuchTable("FILE".to_string()).into())
//! }
//!
//! match example_operation() {
//!     Err(ExtractorError::Storage(e)) => eprintln!("storage: {e}"),
//!     Err(e) => eprintln!("other: {e}"),
//!     Ok(()) => {}
//! }
//! ```

pub mod kinds;
pub mod sqlite;

// Re-export commonly used types
pub use kinds::{ConfigError, ExtractorError, Result, StorageError};
pub use sqlite::classify_sqlite_error;
