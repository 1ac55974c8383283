//! Read access to a single column of an RDSv3 SQLite database
//!
//! This module provides:
//! - [`Reader`]: owns the connection to the database file
//! - [`ColumnQuery`]: the `(table, field)` pair to read
//! - [`ColumnCursor`]: a prepared single-column query
//! - [`ColumnValues`]: the lazy, pull-based sequence of [`FieldValue`]s
//!
//! Rows are fetched one at a time from SQLite, so a table is never held in
//! memory as a whole.
//!
//! # Example
//!
//! ```no_run
//! use nsrl_extract::reader::{ColumnQuery, Reader};
//!
//! # fn main() -> nsrl_extract::Result<()> {
//! let reader = Reader::open("RDS_2024.03.1_modern.db")?;
//! let query = ColumnQuery::new("FILE", "md5");
//! let mut cursor = reader.fetch_all(&query)?;
//! for value in cursor.values()? {
//!     println!("{}", value?);
//! }
//! cursor.finish();
//! reader.close()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension, Rows, Statement, params};
use tracing::{debug, info, trace};

use crate::error::{Result, StorageError, classify_sqlite_error};

pub mod query;
pub mod value;

pub use query::{ColumnQuery, quote_identifier};
pub use value::FieldValue;

/// Read-only handle on a SQLite database file.
pub struct Reader {
    conn: Connection,
    path: String,
}

impl Reader {
    /// Open the database at `path`.
    ///
    /// The file must already exist; it is opened read-only and probed once so
    /// that a file which is not a database is reported here rather than on the
    /// first query.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();

        if !path_ref.exists() {
            return Err(StorageError::NotFound(path_display).into());
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path_ref, flags)
            .map_err(|e| classify_sqlite_error(e, &path_display))?;

        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| classify_sqlite_error(e, &path_display))?;

        debug!("Opened database: {}", path_display);

        Ok(Self {
            conn,
            path: path_display,
        })
    }

    /// Path the reader was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Prepare the query producing every value of `query.field` in `query.table`.
    ///
    /// Unknown tables and fields are reported here, before any value is
    /// produced.
    pub fn fetch_all(&self, query: &ColumnQuery) -> Result<ColumnCursor<'_>> {
        self.check_column(query)?;

        let sql = query.select_sql()?;
        trace!("Preparing: {}", sql);
        let stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| classify_sqlite_error(e, &self.path))?;

        Ok(ColumnCursor {
            stmt,
            query: query.clone(),
            closed: false,
        })
    }

    /// Number of rows in the queried table.
    pub fn count_rows(&self, query: &ColumnQuery) -> Result<u64> {
        let sql = query.count_sql()?;
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| classify_sqlite_error(e, &self.path))?;
        Ok(count.max(0) as u64)
    }

    /// Column names of `table`, in declaration order.
    ///
    /// Empty when the table does not exist.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")
            .map_err(|e| classify_sqlite_error(e, &self.path))?;
        let names = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| classify_sqlite_error(e, &self.path))?;
        Ok(names)
    }

    /// Close the connection.
    ///
    /// Consumes the reader, so a handle can only be closed once.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| StorageError::CloseFailed(e.to_string()))?;
        debug!("Closed database: {}", path);
        Ok(())
    }

    fn check_column(&self, query: &ColumnQuery) -> Result<()> {
        let columns = self.column_names(&query.table)?;
        if columns.is_empty() {
            return Err(StorageError::NoSuchTable(query.table.clone()).into());
        }

        // SQLite resolves identifiers case-insensitively (ASCII only).
        let known = columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&query.field));
        if known || (query.is_rowid_alias() && self.has_rowid(query)?) {
            return Ok(());
        }

        Err(StorageError::NoSuchColumn {
            table: query.table.clone(),
            field: query.field.clone(),
        }
        .into())
    }

    /// Whether the rowid alias named by `query.field` resolves on the table.
    ///
    /// Views and `WITHOUT ROWID` tables have no rowid; a quoted `"rowid"`
    /// would then fall back to a string literal.
    fn has_rowid(&self, query: &ColumnQuery) -> Result<bool> {
        let kind: Option<String> = self
            .conn
            .query_row(
                "SELECT type FROM sqlite_master WHERE name = ?1 COLLATE NOCASE",
                params![query.table],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| classify_sqlite_error(e, &self.path))?;
        if kind.as_deref() != Some("table") {
            return Ok(false);
        }

        // Bare alias from a fixed word list; quoted, it would prepare as a literal.
        let sql = format!(
            "SELECT {} FROM {} LIMIT 0",
            query.field.to_ascii_lowercase(),
            quote_identifier(&query.table)?
        );
        let resolved = self.conn.prepare(&sql).is_ok();
        if !resolved {
            debug!("{} has no {}", query.table, query.field);
        }
        Ok(resolved)
    }
}

/// A prepared single-column query bound to its [`Reader`].
pub struct ColumnCursor<'conn> {
    stmt: Statement<'conn>,
    query: ColumnQuery,
    closed: bool,
}

impl ColumnCursor<'_> {
    /// Execute the query and return the lazy value sequence.
    ///
    /// The sequence is not restartable: calling this again re-runs the query.
    pub fn values(&mut self) -> Result<ColumnValues<'_>> {
        let rows = self
            .stmt
            .query([])
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(ColumnValues {
            rows,
            fetched: 0,
            done: false,
        })
    }

    /// The query this cursor was prepared for.
    pub fn query(&self) -> &ColumnQuery {
        &self.query
    }

    /// End the query and log it.
    ///
    /// The statement is finalized when the cursor is dropped, here or on any
    /// other path; dropping without `finish` only adds a debug line.
    pub fn finish(mut self) {
        self.closed = true;
        info!(
            "Closed query on {}.{}",
            self.query.table, self.query.field
        );
    }
}

impl Drop for ColumnCursor<'_> {
    fn drop(&mut self) {
        if !self.closed {
            debug!("ColumnCursor dropped without explicit finish");
        }
    }
}

/// Lazy sequence of the values of one column.
pub struct ColumnValues<'stmt> {
    rows: Rows<'stmt>,
    fetched: u64,
    done: bool,
}

impl ColumnValues<'_> {
    /// Number of values produced so far.
    pub fn fetched(&self) -> u64 {
        self.fetched
    }
}

impl Iterator for ColumnValues<'_> {
    type Item = Result<FieldValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.rows.next() {
            Ok(Some(row)) => {
                self.fetched += 1;
                Some(
                    row.get_ref(0)
                        .map(FieldValue::from)
                        .map_err(|e| StorageError::QueryFailed(e.to_string()).into()),
                )
            }
            Ok(None) => {
                debug!("Column exhausted after {} values", self.fetched);
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(StorageError::QueryFailed(e.to_string()).into()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ExtractorError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Create `name` in `dir` holding table `FILE(md5, sha1)` with the given md5 values.
    pub(crate) fn create_rds(dir: &TempDir, name: &str, md5s: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE FILE (md5 TEXT, sha1 TEXT)", [])
            .unwrap();
        for md5 in md5s {
            conn.execute(
                "INSERT INTO FILE (md5, sha1) VALUES (?1, ?2)",
                params![md5, format!("sha-{md5}")],
            )
            .unwrap();
        }
        path
    }

    fn collect(reader: &Reader, query: &ColumnQuery) -> Vec<FieldValue> {
        let mut cursor = reader.fetch_all(query).unwrap();
        let values = cursor
            .values()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        cursor.finish();
        values
    }

    #[test]
    fn test_fetch_all_in_row_order() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &["c3d4", "a1b2", "c3d4"]);

        let reader = Reader::open(&path).unwrap();
        let values = collect(&reader, &ColumnQuery::new("FILE", "md5"));
        assert_eq!(
            values,
            vec![
                FieldValue::from("c3d4"),
                FieldValue::from("a1b2"),
                FieldValue::from("c3d4"),
            ]
        );
        reader.close().unwrap();
    }

    #[test]
    fn test_identifiers_are_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &["a1b2"]);

        let reader = Reader::open(&path).unwrap();
        let values = collect(&reader, &ColumnQuery::new("file", "MD5"));
        assert_eq!(values, vec![FieldValue::from("a1b2")]);
    }

    #[test]
    fn test_rowid_field() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &["a", "b"]);

        let reader = Reader::open(&path).unwrap();
        let values = collect(&reader, &ColumnQuery::new("FILE", "rowid"));
        assert_eq!(values, vec![FieldValue::Integer(1), FieldValue::Integer(2)]);
    }

    #[test]
    fn test_count_rows() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &["a", "b", "c"]);

        let reader = Reader::open(&path).unwrap();
        assert_eq!(reader.count_rows(&ColumnQuery::new("FILE", "md5")).unwrap(), 3);
    }

    #[test]
    fn test_mixed_storage_classes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mixed.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE t (v);
                 INSERT INTO t VALUES ('txt'), (7), (2.5), (NULL), (x'00ff');",
            )
            .unwrap();
        }

        let reader = Reader::open(&path).unwrap();
        let values = collect(&reader, &ColumnQuery::new("t", "v"));
        assert_eq!(
            values,
            vec![
                FieldValue::from("txt"),
                FieldValue::Integer(7),
                FieldValue::Real(2.5),
                FieldValue::Null,
                FieldValue::Blob(vec![0x00, 0xff]),
            ]
        );
    }

    #[test]
    fn test_quoted_names_are_not_injected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                r#"CREATE TABLE "my ""table""" ("hash value" TEXT);
                   INSERT INTO "my ""table""" VALUES ('ff00');
                   CREATE TABLE secret (pw TEXT);
                   INSERT INTO secret VALUES ('hunter2');"#,
            )
            .unwrap();
        }

        let reader = Reader::open(&path).unwrap();
        let values = collect(&reader, &ColumnQuery::new("my \"table\"", "hash value"));
        assert_eq!(values, vec![FieldValue::from("ff00")]);

        let injected = ColumnQuery::new("secret", "pw\" FROM secret; --");
        assert!(matches!(
            reader.fetch_all(&injected),
            Err(ExtractorError::Storage(StorageError::NoSuchColumn { .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Reader::open(dir.path().join("absent.db"));
        assert!(matches!(
            result,
            Err(ExtractorError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_not_a_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.db");
        std::fs::write(&path, "this is plain text, definitely not sqlite format 3\n".repeat(20))
            .unwrap();

        let result = Reader::open(&path);
        assert!(matches!(
            result,
            Err(ExtractorError::Storage(StorageError::NotADatabase(_)))
        ));
    }

    #[test]
    fn test_missing_table_and_field() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &["a"]);
        let reader = Reader::open(&path).unwrap();

        assert!(matches!(
            reader.fetch_all(&ColumnQuery::new("PKG", "md5")),
            Err(ExtractorError::Storage(StorageError::NoSuchTable(ref t))) if t == "PKG"
        ));
        assert!(matches!(
            reader.fetch_all(&ColumnQuery::new("FILE", "sha256")),
            Err(ExtractorError::Storage(StorageError::NoSuchColumn { .. }))
        ));
    }

    #[test]
    fn test_rowid_field_needs_a_rowid_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("norowid.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE w (md5 TEXT PRIMARY KEY) WITHOUT ROWID;
                 INSERT INTO w VALUES ('a'), ('b');
                 CREATE VIEW v AS SELECT md5 FROM w;",
            )
            .unwrap();
        }
        let reader = Reader::open(&path).unwrap();

        for table in ["w", "v"] {
            for field in ["rowid", "OID", "_rowid_"] {
                assert!(
                    matches!(
                        reader.fetch_all(&ColumnQuery::new(table, field)),
                        Err(ExtractorError::Storage(StorageError::NoSuchColumn { .. }))
                    ),
                    "{table}.{field} should not resolve"
                );
            }
        }

        let values = collect(&reader, &ColumnQuery::new("v", "md5"));
        assert_eq!(values, vec![FieldValue::from("a"), FieldValue::from("b")]);
    }

    #[test]
    fn test_column_names() {
        let dir = TempDir::new().unwrap();
        let path = create_rds(&dir, "rds.db", &[]);
        let reader = Reader::open(&path).unwrap();

        assert_eq!(reader.column_names("FILE").unwrap(), vec!["md5", "sha1"]);
        assert!(reader.column_names("nope").unwrap().is_empty());
    }
}
