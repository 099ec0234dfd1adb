//! End-to-end driver tests: stdin/stdout, `--check`,
//! `--write`, `--list-different`, and exit-code mapping.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn sqlfmt() -> Command {
    Command::cargo_bin("sqlfmt").unwrap()
}

#[test]
fn formats_stdin_to_stdout() {
    sqlfmt()
        .write_stdin("select 1;")
        .assert()
        .success()
        .stdout("SELECT 1;\n");
}

#[test]
fn empty_stdin_formats_to_empty_output() {
    sqlfmt()
        .write_stdin("   \n\t  ")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn tokenize_error_on_stdin_exits_2() {
    sqlfmt()
        .write_stdin("SELECT 'broken")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("1:"));
}

#[test]
fn check_reports_unformatted_file_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.sql");
    std::fs::write(&path, "select 1;").unwrap();

    sqlfmt()
        .arg("--check")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would reformat"));
}

#[test]
fn check_on_already_formatted_file_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.sql");
    std::fs::write(&path, "SELECT 1;\n").unwrap();

    sqlfmt().arg("--check").arg(&path).assert().success();
}

#[test]
fn write_overwrites_the_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.sql");
    std::fs::write(&path, "select 1;").unwrap();

    sqlfmt().arg("--write").arg(&path).assert().success();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "SELECT 1;\n");
}

#[test]
fn list_different_prints_only_changed_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let changed = dir.path().join("changed.sql");
    let clean = dir.path().join("clean.sql");
    std::fs::write(&changed, "select 1;").unwrap();
    std::fs::write(&clean, "SELECT 1;\n").unwrap();

    let assert = sqlfmt()
        .arg("--list-different")
        .arg(&changed)
        .arg(&clean)
        .assert()
        .code(1);
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.contains("changed.sql"));
    assert!(!out.contains("clean.sql"));
}

#[test]
fn write_conflicts_with_check() {
    sqlfmt()
        .arg("--write")
        .arg("--check")
        .arg("a.sql")
        .assert()
        .failure();
}

#[test]
fn write_without_file_arguments_is_rejected() {
    sqlfmt().arg("--write").assert().code(1);
}

#[test]
fn diff_requires_check() {
    sqlfmt().arg("--diff").arg("a.sql").assert().failure();
}

#[test]
fn help_flag_exits_zero() {
    sqlfmt().arg("--help").assert().success();
}

#[test]
fn version_flag_exits_zero() {
    sqlfmt().arg("--version").assert().success();
}

#[test]
fn check_with_diff_shows_a_unified_diff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.sql");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b"select a,b from t;").unwrap();

    sqlfmt()
        .arg("--check")
        .arg("--diff")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("---"))
        .stdout(predicate::str::contains("+++"));
}
