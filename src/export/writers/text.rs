//! Plain text hash list writer
//!
//! Writes the header line followed by one value per line, the list format
//! forensic tools import as a hash set.

use std::io::{BufWriter, Write};

use tracing::debug;

use crate::error::Result;
use crate::reader::FieldValue;

use super::{FormatWriter, LINE_ENDING};

/// Writer for the one-value-per-line list format
pub struct HashListWriter<W: Write> {
    /// Buffered sink
    writer: BufWriter<W>,
    /// Name of the sink, for logging
    name: String,
    /// Text written for NULL values
    null_text: String,
    /// Number of values written
    written: u64,
    /// Number of bytes written
    bytes: u64,
}

impl<W: Write> HashListWriter<W> {
    /// Create a new list writer
    ///
    /// # Arguments
    /// * `sink` - Output sink
    /// * `name` - Sink name used in log messages
    /// * `buffer_size` - Capacity of the write buffer
    /// * `null_text` - Text written for NULL values
    pub fn new(sink: W, name: impl Into<String>, buffer_size: usize, null_text: impl Into<String>) -> Self {
        let name = name.into();
        debug!("Created list writer for: {}", name);

        Self {
            writer: BufWriter::with_capacity(buffer_size.max(1), sink),
            name,
            null_text: null_text.into(),
            written: 0,
            bytes: 0,
        }
    }

    /// Number of values written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and hand back the sink
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(LINE_ENDING.as_bytes())?;
        self.bytes += (line.len() + LINE_ENDING.len()) as u64;
        Ok(())
    }
}

impl<W: Write> FormatWriter for HashListWriter<W> {
    fn write_header(&mut self, header: &str) -> Result<()> {
        self.write_line(header)?;
        debug!("Wrote header '{}' to {}", header, self.name);
        Ok(())
    }

    fn write_batch(&mut self, values: &[FieldValue]) -> Result<usize> {
        for value in values {
            let line = value.render(&self.null_text).into_owned();
            self.write_line(&line)?;
        }

        self.written += values.len() as u64;
        debug!(
            "Wrote {} values to {} (total: {})",
            values.len(),
            self.name,
            self.written
        );

        Ok(values.len())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        debug!("Finalized {} ({} values)", self.name, self.written);
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}
