//! Export pipeline: one column of a SQLite table into a text list
//!
//! The export system is built on three components:
//!
//! 1. **Reader** (see [`crate::reader`]): lazy single-column value sequence
//! 2. **ProgressTracker**: real-time feedback on stderr
//! 3. **FormatWriter**: writes the header and values to the sink
//!
//! These are orchestrated by the **ExportCoordinator**. [`export`] runs one
//! complete pass:
//!
//! open database → prepare query → header → values → close sink → close database
//!
//! The query is prepared before anything is written, so a missing table or
//! field fails with the sink still empty. A failure while streaming leaves the
//! values written so far in the sink; nothing is rolled back.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use nsrl_extract::export::{export, ExportOptions, ExportRequest};
//! use nsrl_extract::reader::ColumnQuery;
//!
//! # fn main() -> nsrl_extract::Result<()> {
//! let request = ExportRequest::new(
//!     "RDS_2024.03.1_modern.db",
//!     File::create("md5.txt")?,
//!     "md5.txt",
//!     ColumnQuery::new("FILE", "md5"),
//! );
//! let summary = export(request, &ExportOptions::default())?;
//! println!("{} hashes", summary.rows_exported);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::reader::{ColumnQuery, Reader};

pub mod coordinator;
pub mod progress;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportSummary};
pub use progress::ProgressTracker;
pub use writers::{FormatWriter, HashListWriter, LINE_ENDING, create_output};

/// Everything one export pass needs: source, sink and column.
pub struct ExportRequest<W: Write> {
    /// Source database file
    pub db_path: PathBuf,
    /// Output sink, closed when the export finishes
    pub sink: W,
    /// Sink name for log messages
    pub sink_name: String,
    /// Table and field to export
    pub query: ColumnQuery,
}

impl<W: Write> ExportRequest<W> {
    pub fn new(
        db_path: impl Into<PathBuf>,
        sink: W,
        sink_name: impl Into<String>,
        query: ColumnQuery,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            sink,
            sink_name: sink_name.into(),
            query,
        }
    }
}

/// Tunables of the export pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Values pulled from the database per batch
    pub batch_size: usize,
    /// Capacity of the output buffer in bytes
    pub buffer_size: usize,
    /// Text written for NULL values
    pub null_text: String,
    /// Show a progress bar on stderr
    pub progress: bool,
    /// Size the progress bar with a `count(*)` pass before exporting
    pub count_rows: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ExportOptions {
    /// Build options from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.export.batch_size,
            buffer_size: config.export.buffer_size,
            null_text: config.export.null_text.clone(),
            progress: config.display.progress,
            count_rows: config.display.count_rows,
        }
    }

    /// Same options with the progress bar switched off.
    pub fn without_progress(mut self) -> Self {
        self.progress = false;
        self
    }
}

/// Run one export pass.
///
/// Writes the upper-cased field name, then every value of the column in the
/// order SQLite returns them, one per line. The sink and the database are
/// both closed when this returns successfully.
pub fn export<W: Write>(request: ExportRequest<W>, options: &ExportOptions) -> Result<ExportSummary> {
    let ExportRequest {
        db_path,
        sink,
        sink_name,
        query,
    } = request;

    info!(
        "Exporting {}.{} from {} to {}",
        query.table,
        query.field,
        db_path.display(),
        sink_name
    );

    let reader = Reader::open(&db_path)?;
    let mut cursor = reader.fetch_all(&query)?;

    let total = if options.progress && options.count_rows {
        Some(reader.count_rows(&query)?)
    } else {
        None
    };

    let summary = {
        let writer = HashListWriter::new(sink, sink_name, options.buffer_size, options.null_text.as_str());
        let tracker = ProgressTracker::new(
            &format!("{}.{}", query.table, query.field),
            total,
            options.progress,
        );
        let mut coordinator = ExportCoordinator::new(tracker, Box::new(writer), options.batch_size);

        let values = cursor.values()?;
        coordinator.execute(&query.header(), values)?
    };

    cursor.finish();
    reader.close()?;

    Ok(summary)
}

/// Run one export pass into a newly created file at `out_path`.
pub fn export_to_file(
    db_path: &Path,
    out_path: &Path,
    query: ColumnQuery,
    options: &ExportOptions,
) -> Result<ExportSummary> {
    let file = create_output(out_path)?;
    let request = ExportRequest::new(db_path, file, out_path.display().to_string(), query);
    export(request, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractorError, StorageError};
    use crate::reader::tests::create_rds;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn options() -> ExportOptions {
        ExportOptions {
            batch_size: 2,
            buffer_size: 16,
            null_text: String::new(),
            progress: false,
            count_rows: false,
        }
    }

    fn run(db: &Path, table: &str, field: &str) -> Result<(Vec<u8>, ExportSummary)> {
        let mut out = Vec::new();
        let request = ExportRequest::new(db, &mut out, "memory", ColumnQuery::new(table, field));
        let summary = export(request, &options())?;
        Ok((out, summary))
    }

    fn joined(lines: &[&str]) -> String {
        lines
            .iter()
            .map(|l| format!("{l}{LINE_ENDING}"))
            .collect()
    }

    #[test]
    fn test_end_to_end_md5_list() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a1b2", "c3d4"]);

        let (out, summary) = run(&db, "FILE", "md5").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), joined(&["MD5", "a1b2", "c3d4"]));
        assert_eq!(summary.rows_exported, 2);
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &[]);

        let (out, summary) = run(&db, "FILE", "md5").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), joined(&["MD5"]));
        assert_eq!(summary.rows_exported, 0);
    }

    #[test]
    fn test_line_count_order_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let md5s = ["ff", "00", "ff", "aa", "00"];
        let db = create_rds(&dir, "rds.db", &md5s);

        let (out, summary) = run(&db, "FILE", "md5").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), md5s.len() + 1);
        assert_eq!(&lines[1..], &md5s);
        assert_eq!(summary.bytes_written, text.len() as u64);
    }

    #[test]
    fn test_header_uppercases_any_field_name() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("odd.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                r#"CREATE TABLE FILE ("Sha-1/x" TEXT);
                   INSERT INTO FILE VALUES ('abc');"#,
            )
            .unwrap();
        }

        let (out, _) = run(&db, "FILE", "Sha-1/x").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next(), Some("SHA-1/X"));
    }

    #[test]
    fn test_exports_are_byte_identical() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["1", "2", "3"]);

        let (first, _) = run(&db, "FILE", "sha1").unwrap();
        let (second, _) = run(&db, "FILE", "sha1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_table_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a"]);

        let mut out = Vec::new();
        let request = ExportRequest::new(&db, &mut out, "memory", ColumnQuery::new("PKG", "md5"));
        let err = export(request, &options()).unwrap_err();

        assert!(matches!(
            err,
            ExtractorError::Storage(StorageError::NoSuchTable(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_field_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a"]);

        let mut out = Vec::new();
        let request = ExportRequest::new(&db, &mut out, "memory", ColumnQuery::new("FILE", "sha256"));
        let err = export(request, &options()).unwrap_err();

        assert!(err.is_storage());
        assert!(out.is_empty());
    }

    #[test]
    fn test_rowid_of_table_without_rowid_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("norowid.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                "CREATE TABLE w (md5 TEXT PRIMARY KEY) WITHOUT ROWID;
                 INSERT INTO w VALUES ('a'), ('b');
                 CREATE VIEW v AS SELECT md5 FROM w;",
            )
            .unwrap();
        }

        for table in ["w", "v"] {
            let mut out = Vec::new();
            let request = ExportRequest::new(&db, &mut out, "memory", ColumnQuery::new(table, "rowid"));
            let err = export(request, &options()).unwrap_err();

            assert!(matches!(
                err,
                ExtractorError::Storage(StorageError::NoSuchColumn { .. })
            ));
            assert!(out.is_empty());
        }

        let (out, _) = run(&db, "w", "md5").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), joined(&["MD5", "a", "b"]));
    }

    #[test]
    fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir.path().join("none.db"), "FILE", "md5").unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::Storage(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a1b2", "c3d4"]);
        let out = dir.path().join("hashes.txt");

        let summary =
            export_to_file(&db, &out, ColumnQuery::new("FILE", "md5"), &options()).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content, joined(&["MD5", "a1b2", "c3d4"]));
        assert_eq!(summary.bytes_written, content.len() as u64);
    }

    #[test]
    fn test_null_text_option() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("nulls.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch("CREATE TABLE t (h); INSERT INTO t VALUES ('x'), (NULL);")
                .unwrap();
        }

        let mut out = Vec::new();
        let request = ExportRequest::new(&db, &mut out, "memory", ColumnQuery::new("t", "h"));
        let opts = ExportOptions {
            null_text: "NULL".to_string(),
            ..options()
        };
        export(request, &opts).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), joined(&["H", "x", "NULL"]));
    }

    #[test]
    fn test_counted_progress_exports_the_same() {
        let dir = TempDir::new().unwrap();
        let db = create_rds(&dir, "rds.db", &["a1b2", "c3d4"]);

        let mut out = Vec::new();
        let request = ExportRequest::new(&db, &mut out, "memory", ColumnQuery::new("FILE", "md5"));
        let opts = ExportOptions {
            progress: true,
            count_rows: true,
            ..options()
        };
        let summary = export(request, &opts).unwrap();

        assert_eq!(summary.rows_exported, 2);
        assert_eq!(String::from_utf8(out).unwrap(), joined(&["MD5", "a1b2", "c3d4"]));
    }

    #[test]
    fn test_options_follow_config() {
        let opts = ExportOptions::default();
        assert_eq!(opts.batch_size, Config::default().export.batch_size);
        assert!(!opts.count_rows);
        assert!(!opts.clone().without_progress().progress);
    }
}
