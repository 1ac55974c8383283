//! NSRL RDSv3 Extractor Library
//!
//! Extracts one column of values (usually file hashes) from a table of an
//! NSRL RDSv3 SQLite database into a plain text list: the upper-cased field
//! name on the first line, then one value per line.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Export pipeline (coordinator, writers, progress)
//! - `interactive`: Terminal form for interactive use
//! - `reader`: Lazy single-column reads from SQLite
//!
//! # Example
//!
//! ```no_run
//! use nsrl_extract::export::{export_to_file, ExportOptions};
//! use nsrl_extract::reader::ColumnQuery;
//! use std::path::Path;
//!
//! # fn main() -> nsrl_extract::Result<()> {
//! let summary = export_to_file(
//!     Path::new("RDS_2024.03.1_modern.db"),
//!     Path::new("md5.txt"),
//!     ColumnQuery::new("FILE", "md5"),
//!     &ExportOptions::default(),
//! )?;
//! println!("Exported {} hashes", summary.rows_exported);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod reader;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExtractorError, Result, StorageError};
pub use export::{ExportOptions, ExportRequest, ExportSummary, export};
pub use reader::{ColumnQuery, FieldValue, Reader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Descriptive build metadata handed to the front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub version: &'static str,
    pub authors: &'static str,
    pub license: &'static str,
    pub description: &'static str,
}

impl AppInfo {
    /// Metadata of this build, taken from the package manifest.
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            title: "NSRL_RDSv3_Extractor",
            version: env!("CARGO_PKG_VERSION"),
            authors: env!("CARGO_PKG_AUTHORS"),
            license: env!("CARGO_PKG_LICENSE"),
            description: env!("CARGO_PKG_DESCRIPTION"),
        }
    }

    /// Window-style title, e.g. `NSRL_RDSv3_Extractor v0.1.0`.
    pub fn banner(&self) -> String {
        format!("{} v{}", self.title, self.version)
    }
}

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
