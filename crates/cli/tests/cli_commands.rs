mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::DiffFixture;
use predicates::prelude::*;

/// `show` prints the summary line and the resolved primary name.
#[test]
fn show_prints_match_table() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("show")
        .arg("--db")
        .arg(&fixture.db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matches (role: none, primary: a.bin, secondary: b.bin)"))
        .stdout(predicate::str::contains("foo"))
        .stdout(predicate::str::contains("hash-match"));
}

#[test]
fn show_json_is_machine_readable() {
    let fixture = DiffFixture::scenario();
    let output = cargo_bin_cmd!("bindiff-viewer")
        .arg("show")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--json")
        .output()
        .expect("run show --json");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(rows[0]["row"], 0);
    assert_eq!(rows[0]["primary_address"], "1000");
    assert_eq!(rows[0]["primary_name"], "foo");
    assert_eq!(rows[0]["secondary_name"], "");
    assert_eq!(rows[0]["algorithm"], "hash-match");
}

#[test]
fn show_fails_for_missing_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    cargo_bin_cmd!("bindiff-viewer")
        .arg("show")
        .arg("--db")
        .arg(dir.path().join("missing.BinDiff"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load matches"));
}

#[test]
fn show_fails_for_unknown_algorithm() {
    let fixture = DiffFixture::new();
    fixture.add_match(Some(0x1000), Some(0x2000), 0.9, 0.9, 42);
    cargo_bin_cmd!("bindiff-viewer")
        .arg("show")
        .arg("--db")
        .arg(&fixture.db_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("algorithm"));
}

#[test]
fn invalid_role_is_rejected() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("show")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--role")
        .arg("tertiary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid role 'tertiary'"));
}

/// Porting into the secondary binary writes a user symbol at 0x2000.
#[test]
fn port_updates_symbol_file() {
    let fixture = DiffFixture::scenario();
    let symbols = fixture.write_symbols(&[]);

    cargo_bin_cmd!("bindiff-viewer")
        .arg("port")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--role")
        .arg("secondary")
        .arg("--symbols")
        .arg(&symbols)
        .arg("--rows")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] <unnamed> @ 2000 -> foo"))
        .stdout(predicate::str::contains("Ported 1 of 1 rows"));

    let written = fixture.read_symbols();
    assert_eq!(written["symbols"][0]["address"], 0x2000);
    assert_eq!(written["symbols"][0]["name"], "foo");
    assert_eq!(written["symbols"][0]["auto"], false);
}

#[test]
fn port_reports_refusals_per_row() {
    let fixture = DiffFixture::scenario();
    let symbols = fixture.write_symbols(&[(0x1000, "bar", false)]);

    cargo_bin_cmd!("bindiff-viewer")
        .arg("port")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--role")
        .arg("primary")
        .arg("--symbols")
        .arg(&symbols)
        .arg("--rows")
        .arg("0,3")
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] skipped: bar @ 1000 has no source name"))
        .stdout(predicate::str::contains("[3] skipped: row 3 does not exist"))
        .stdout(predicate::str::contains("Ported 0 of 2 rows"));
}

#[test]
fn port_without_role_is_disabled() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("port")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Porting disabled"));
}

#[test]
fn locate_prints_live_address() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("locate")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--role")
        .arg("secondary")
        .arg("--row")
        .arg("0")
        .assert()
        .success()
        .stdout("2000\n");
}

#[test]
fn locate_without_role_fails() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("locate")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--row")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Navigation requires"));
}

#[test]
fn info_reports_metadata_and_exports() {
    let fixture = DiffFixture::scenario();
    cargo_bin_cmd!("bindiff-viewer")
        .arg("info")
        .arg("--db")
        .arg(&fixture.db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: BinDiff 8"))
        .stdout(predicate::str::contains("Similarity: 0.75"))
        .stdout(predicate::str::contains("Architecture: x86-64"))
        .stdout(predicate::str::contains("Call graph: 1 functions (1 named), 0 calls"));
}

#[test]
fn info_rejects_binary_with_wrong_hash() {
    let fixture = DiffFixture::scenario();
    let binary = fixture.path().join("a.bin");
    std::fs::write(&binary, b"not the recorded binary").expect("write binary");

    cargo_bin_cmd!("bindiff-viewer")
        .arg("info")
        .arg("--db")
        .arg(&fixture.db_path)
        .arg("--role")
        .arg("primary")
        .arg("--binary")
        .arg(&binary)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match a.bin"));
}
