use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, ValueRef};
use rusqlite::{params, Connection, OpenFlags, Row};
use thiserror::Error;

use crate::db::{AlgorithmNames, FileRecord, FunctionMatch, MatchMetadata};

/// Tables a match database must provide.
pub const REQUIRED_TABLES: [&str; 4] = ["metadata", "file", "function", "functionalgorithm"];

/// Error type for match database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Failed to open match database at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Match database has no '{0}' table")]
    MissingTable(&'static str),

    /// The `metadata` table must hold exactly one row.
    #[error("Expected exactly one metadata row, found {0}")]
    MetadataRowCount(usize),

    #[error("File id {id} appears {count} times in the file table")]
    DuplicateFile { id: i64, count: usize },

    #[error("Function row {row} has no {field}")]
    MissingScore { row: i64, field: &'static str },

    #[error("Function row {row} has {field} {value} outside 0..=1")]
    ScoreOutOfRange { row: i64, field: &'static str, value: f64 },

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// A row references a lookup entry that does not exist.
///
/// This indicates a corrupt database rather than a recoverable condition.
#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
    #[error("File id {0} has no record in the file table")]
    UnknownFile(i64),

    #[error("Function row {row} references unknown algorithm id {algorithm}")]
    UnknownAlgorithm { row: i64, algorithm: i64 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// Read-only accessor over a BinDiff match database.
///
/// The connection is opened with `SQLITE_OPEN_READ_ONLY` and additionally
/// marked `query_only`, so no statement issued through it can mutate the file.
#[derive(Debug)]
pub struct MatchDb {
    conn: Connection,
}

impl MatchDb {
    /// Open an existing match database read-only and check its tables.
    pub fn open_read_only(path: &Path) -> DbResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|source| DbError::Open { path: path.to_path_buf(), source })?;
        conn.pragma_update(None, "query_only", true)?;

        let db = Self { conn };
        db.check_tables()?;
        Ok(db)
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn check_tables(&self) -> DbResult<()> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT COUNT(*) FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1
            "#,
        )?;
        for table in REQUIRED_TABLES {
            let count: i64 = stmt.query_row(params![table], |row| row.get(0))?;
            if count == 0 {
                return Err(DbError::MissingTable(table));
            }
        }
        Ok(())
    }

    /// Load the singleton metadata row.
    pub fn metadata(&self) -> DbResult<MatchMetadata> {
        let mut stmt = self.conn.prepare("SELECT * FROM metadata")?;
        let rows = stmt.query_map([], |row| {
            Ok(MatchMetadata {
                file1: row.get("file1")?,
                file2: row.get("file2")?,
                version: optional_text(row, "version")?,
                description: optional_text(row, "description")?,
                created: optional_text(row, "created")?,
                similarity: optional_column(row, "similarity")?,
                confidence: optional_column(row, "confidence")?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        if out.len() != 1 {
            return Err(DbError::MetadataRowCount(out.len()));
        }
        Ok(out.remove(0))
    }

    /// Load the file record with the given id; the id must be unique.
    pub fn file_record(&self, id: i64) -> DbResult<FileRecord> {
        let mut stmt = self.conn.prepare("SELECT * FROM file WHERE id = ?1")?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(FileRecord {
                id: row.get("id")?,
                filename: row.get("filename")?,
                exe_filename: optional_text(row, "exefilename")?,
                hash: optional_text(row, "hash")?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        match out.len() {
            0 => Err(IntegrityError::UnknownFile(id).into()),
            1 => Ok(out.remove(0)),
            count => Err(DbError::DuplicateFile { id, count }),
        }
    }

    /// Load every function match, in storage order.
    ///
    /// Rows with a missing or out-of-range score are rejected here so nothing
    /// downstream ever sees them.
    pub fn all_matches(&self) -> DbResult<Vec<FunctionMatch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT rowid, address1, address2, similarity, confidence, algorithm
            FROM function
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<f64>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, address1, address2, similarity, confidence, algorithm) = row?;
            out.push(FunctionMatch {
                id,
                address1: address1.map(|a| a as u64),
                address2: address2.map(|a| a as u64),
                similarity: checked_score(id, "similarity", similarity)?,
                confidence: checked_score(id, "confidence", confidence)?,
                algorithm,
            });
        }
        Ok(out)
    }

    /// Load the `functionalgorithm` lookup.
    pub fn algorithm_names(&self) -> DbResult<AlgorithmNames> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM functionalgorithm")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        let mut names = AlgorithmNames::new();
        for row in rows {
            let (id, name) = row?;
            names.insert(id, name);
        }
        Ok(names)
    }
}

fn checked_score(row: i64, field: &'static str, value: Option<f64>) -> DbResult<f64> {
    let value = value.ok_or(DbError::MissingScore { row, field })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(DbError::ScoreOutOfRange { row, field, value });
    }
    Ok(value)
}

/// Read a column that older or newer schemas may not have.
fn optional_column<T: FromSql>(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<T>>(name) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Like [`optional_column`], rendering any scalar storage class as text.
fn optional_text(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<String>> {
    let value = match row.get_ref(name) {
        Ok(value) => value,
        Err(rusqlite::Error::InvalidColumnName(_)) => return Ok(None),
        Err(err) => return Err(err),
    };
    Ok(match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(b.iter().map(|byte| format!("{byte:02x}")).collect()),
    })
}
