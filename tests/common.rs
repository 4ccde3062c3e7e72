#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rta() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// leftovers of a previous run (including the WAL side files).
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        fs::remove_file(format!("{}{}", db_path, suffix)).ok();
    }
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB and enroll students S1..S3 and staff T1.
pub fn init_db_with_subjects(db_path: &str) {
    rta()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for id in ["S1", "S2", "S3"] {
        rta()
            .args(["--db", db_path, "enroll", id, "--kind", "student"])
            .assert()
            .success();
    }

    rta()
        .args(["--db", db_path, "enroll", "T1", "--kind", "staff"])
        .assert()
        .success();
}

/// Run `scan` for a student at a school-local instant.
pub fn scan_student(db_path: &str, id: &str, at: &str) -> assert_cmd::assert::Assert {
    rta()
        .args(["--db", db_path, "scan", id, "--kind", "student", "--at", at])
        .assert()
}
