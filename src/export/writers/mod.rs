//! Format writers for export operations
//!
//! This module provides the interface the export coordinator writes through,
//! and helpers for opening output files.

use std::fs::File;
use std::path::Path;

use crate::error::{ExtractorError, Result};
use crate::reader::FieldValue;

pub mod text;

pub use text::HashListWriter;

/// Line terminator of the platform the tool runs on.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Trait for writing exported values to an output sink
pub trait FormatWriter {
    /// Write the header line
    ///
    /// # Arguments
    /// * `header` - Header text, without line terminator
    fn write_header(&mut self, header: &str) -> Result<()>;

    /// Write a batch of values, one line each
    ///
    /// # Arguments
    /// * `values` - Values to write, in order
    ///
    /// # Returns
    /// * `Result<usize>` - Number of values written
    fn write_batch(&mut self, values: &[FieldValue]) -> Result<usize>;

    /// Finalize the output (flush buffers)
    fn finalize(&mut self) -> Result<()>;

    /// Number of bytes handed to the sink so far
    fn bytes_written(&self) -> u64;
}

/// Create (or truncate) the output file at `path`
///
/// # Arguments
/// * `path` - File path to create
///
/// # Returns
/// * `Result<File>` - Open file or error
pub fn create_output(path: &Path) -> Result<File> {
    validate_path(path)?;
    File::create(path).map_err(|e| {
        ExtractorError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create {}: {}", path.display(), e),
        ))
    })
}

/// Check that the parent directory of `path` exists
///
/// # Arguments
/// * `path` - File path to validate
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ExtractorError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory does not exist: {}", parent.display()),
            )));
        }
    }

    Ok(())
}
