//! Export coordinator for orchestrating export operations
//!
//! This module provides the coordinator that pulls values from a column in
//! batches, hands them to a format writer and keeps the progress bar current.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::reader::FieldValue;

use super::progress::ProgressTracker;
use super::writers::FormatWriter;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of values exported (header not included)
    pub rows_exported: u64,
    /// Bytes written to the sink, header included
    pub bytes_written: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for export operations
///
/// Orchestrates the value stream, progress tracking and format writing.
pub struct ExportCoordinator<'w> {
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Format writer for output
    writer: Box<dyn FormatWriter + 'w>,
    /// Number of values pulled per batch
    batch_size: usize,
}

impl<'w> ExportCoordinator<'w> {
    /// Create a new export coordinator
    pub fn new(tracker: ProgressTracker, writer: Box<dyn FormatWriter + 'w>, batch_size: usize) -> Self {
        Self {
            tracker,
            writer,
            batch_size: batch_size.max(1),
        }
    }

    /// Execute the export operation
    ///
    /// 1. Write the header line
    /// 2. Pull values in batches and write them in order
    /// 3. Track progress
    /// 4. Finalize the output and return statistics
    ///
    /// Values fetched before a failing row are still written, so the sink
    /// holds everything up to the failure.
    ///
    /// # Arguments
    /// * `header` - Header line
    /// * `values` - Lazy value sequence
    ///
    /// # Returns
    /// * `Result<ExportSummary>` - Export statistics or error
    pub fn execute<I>(&mut self, header: &str, mut values: I) -> Result<ExportSummary>
    where
        I: Iterator<Item = Result<FieldValue>>,
    {
        let start_time = Instant::now();

        info!("Starting export operation");
        self.writer.write_header(header)?;

        let mut exported = 0u64;
        let mut batch_count = 0u32;
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            batch.clear();
            let mut failure = None;

            for item in values.by_ref().take(self.batch_size) {
                match item {
                    Ok(value) => batch.push(value),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            if !batch.is_empty() {
                debug!("Received batch of {} values", batch.len());
                self.writer.write_batch(&batch)?;

                exported += batch.len() as u64;
                self.tracker.update(exported);
                batch_count += 1;

                if batch_count % 10 == 0 {
                    info!(
                        "Progress: {} values exported ({} batches)",
                        exported, batch_count
                    );
                }
            }

            if let Some(e) = failure {
                self.tracker.finish();
                if let Err(flush) = self.writer.finalize() {
                    warn!("Failed to flush partial output: {}", flush);
                }
                return Err(e);
            }

            if batch.len() < self.batch_size {
                debug!("No more values available");
                break;
            }
        }

        debug!("Finalizing output");
        self.writer.finalize()?;
        self.tracker.finish();

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let bytes_written = self.writer.bytes_written();

        info!(
            "Export completed: {} values, {} bytes, {} ms",
            exported, bytes_written, elapsed_ms
        );

        Ok(ExportSummary {
            rows_exported: exported,
            bytes_written,
            elapsed_ms,
        })
    }
}
