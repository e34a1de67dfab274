use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::write_script(&["insert, , 1.00, "]).unwrap();

    let mut cmd = Command::new(cargo_bin!("vendomat"));
    cmd.arg("--state-file")
        .arg(dir.path().join("state.json"))
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .arg("run")
        .arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to JSON file storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let script = common::write_script(&["insert, , 1.00, ", "balance, , , "]).unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("vendomat"));
    cmd.arg("--db-path").arg(&db_path).arg("run").arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not())
        .stdout(predicate::str::contains(r#""insertedAmount":1.0"#));
}
