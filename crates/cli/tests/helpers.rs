use std::fs;

use bindiff_viewer::{format_timestamp, sha256_file};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

#[test]
fn sha256_file_matches_in_memory_digest() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.bin");
    fs::write(&path, b"dummy-binary").expect("write binary");

    let mut hasher = Sha256::new();
    hasher.update(b"dummy-binary");
    let expected = format!("{:x}", hasher.finalize());
    assert_eq!(sha256_file(&path).expect("hash"), expected);
}

#[test]
fn sha256_file_reports_missing_file() {
    let dir = tempdir().expect("tempdir");
    let err = sha256_file(&dir.path().join("missing.bin")).unwrap_err();
    assert!(err.to_string().contains("Failed to open binary for hashing"));
}

#[test]
fn format_timestamp_renders_rfc3339_or_unknown() {
    assert_eq!(format_timestamp(Some(0)), "1970-01-01T00:00:00+00:00");
    assert_eq!(format_timestamp(None), "(unknown)");
}
