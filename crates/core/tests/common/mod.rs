//! Fixture builders shared by the integration tests: a BinDiff-shaped match
//! database and BinExport-shaped call-graph exports.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::{tempdir, TempDir};

pub const SCHEMA: &str = r#"
CREATE TABLE metadata (
    version     TEXT,
    file1       INTEGER,
    file2       INTEGER,
    description TEXT,
    created     DATE,
    modified    DATE,
    similarity  DOUBLE PRECISION,
    confidence  DOUBLE PRECISION
);
CREATE TABLE file (
    id          INTEGER PRIMARY KEY,
    filename    TEXT,
    exefilename TEXT,
    hash        CHARACTER(64)
);
CREATE TABLE function (
    id          INTEGER PRIMARY KEY,
    address1    BIGINT,
    name1       TEXT,
    address2    BIGINT,
    name2       TEXT,
    similarity  DOUBLE PRECISION,
    confidence  DOUBLE PRECISION,
    flags       INTEGER,
    algorithm   SMALLINT
);
CREATE TABLE functionalgorithm (
    id   SMALLINT PRIMARY KEY,
    name TEXT
);
"#;

/// A temp directory holding `a_vs_b.BinDiff` plus exports.
pub struct DiffFixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
}

impl DiffFixture {
    /// Schema only, no rows.
    pub fn empty() -> Self {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("a_vs_b.BinDiff");
        let conn = Connection::open(&db_path).expect("create match db");
        conn.execute_batch(SCHEMA).expect("create schema");
        Self { dir, db_path }
    }

    /// Two files (`a.bin`, `b.bin`), one metadata row, algorithm 1
    /// (`hash-match`), empty exports for both files.
    pub fn new() -> Self {
        let fixture = Self::empty();
        {
            let conn = fixture.conn();
            conn.execute(
                r#"
                INSERT INTO metadata (version, file1, file2, description, created, similarity, confidence)
                VALUES ('BinDiff 8', 1, 2, 'a vs b', '2024-01-02 03:04:05', 0.75, 0.5)
                "#,
                [],
            )
            .expect("insert metadata");
            fixture.add_file(1, "a.bin", Some("aa"));
            fixture.add_file(2, "b.bin", Some("bb"));
            fixture.add_algorithm(1, "hash-match");
        }
        fixture.write_export("a.bin", &[]);
        fixture.write_export("b.bin", &[]);
        fixture
    }

    /// The end-to-end scenario: one match `0x1000 <-> 0x2000`, and `foo` at
    /// `0x1000` in the export of `a.bin`.
    pub fn scenario() -> Self {
        let fixture = Self::new();
        fixture.add_match(Some(0x1000), Some(0x2000), 0.9, 0.8, 1);
        fixture.write_export("a.bin", &[(0x1000, "foo")]);
        fixture
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.db_path).expect("open match db for setup")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_file(&self, id: i64, filename: &str, hash: Option<&str>) {
        self.conn()
            .execute(
                "INSERT INTO file (id, filename, exefilename, hash) VALUES (?1, ?2, ?2, ?3)",
                params![id, filename, hash],
            )
            .expect("insert file");
    }

    pub fn add_algorithm(&self, id: i64, name: &str) {
        self.conn()
            .execute("INSERT INTO functionalgorithm (id, name) VALUES (?1, ?2)", params![id, name])
            .expect("insert algorithm");
    }

    pub fn add_match(
        &self,
        address1: Option<u64>,
        address2: Option<u64>,
        similarity: f64,
        confidence: f64,
        algorithm: i64,
    ) {
        self.conn()
            .execute(
                r#"
                INSERT INTO function (address1, address2, similarity, confidence, flags, algorithm)
                VALUES (?1, ?2, ?3, ?4, 0, ?5)
                "#,
                params![
                    address1.map(|a| a as i64),
                    address2.map(|a| a as i64),
                    similarity,
                    confidence,
                    algorithm
                ],
            )
            .expect("insert function match");
    }

    pub fn write_export(&self, filename: &str, vertices: &[(u64, &str)]) {
        let path = self.dir.path().join(format!("{filename}.BinExport"));
        std::fs::write(path, encode_export(filename, vertices)).expect("write export");
    }
}

fn varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn bytes_field(field: u64, payload: &[u8], out: &mut Vec<u8>) {
    varint(field << 3 | 2, out);
    varint(payload.len() as u64, out);
    out.extend_from_slice(payload);
}

fn varint_field(field: u64, value: u64, out: &mut Vec<u8>) {
    varint(field << 3, out);
    varint(value, out);
}

/// Encode a minimal BinExport2 message: meta with the executable name and a
/// call graph with one vertex per `(address, mangled_name)`.
pub fn encode_export(executable_name: &str, vertices: &[(u64, &str)]) -> Vec<u8> {
    let mut meta = Vec::new();
    bytes_field(1, executable_name.as_bytes(), &mut meta);
    bytes_field(3, b"x86-64", &mut meta);
    varint_field(4, 1_700_000_000, &mut meta);

    let mut graph = Vec::new();
    for (address, name) in vertices {
        let mut vertex = Vec::new();
        varint_field(1, *address, &mut vertex);
        bytes_field(3, name.as_bytes(), &mut vertex);
        bytes_field(1, &vertex, &mut graph);
    }

    let mut message = Vec::new();
    bytes_field(1, &meta, &mut message);
    bytes_field(8, &graph, &mut message);
    message
}
