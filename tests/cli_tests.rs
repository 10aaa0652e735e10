//! Binary-level tests: argument handling, exit status and dry-run output

use assert_cmd::Command;
use filetime::FileTime;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn twinsync() -> Command {
    Command::cargo_bin("twinsync").expect("binary is built")
}

fn write(path: &Path, content: &[u8], mtime: i64) {
    fs::write(path, content).expect("write file");
    filetime::set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).expect("set mtime");
}

#[test]
fn test_help_lists_options() {
    twinsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--one-direction-sync"))
        .stdout(predicate::str::contains("--delete-orphans"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_source_fails() {
    let dst = TempDir::new().expect("create dst tempdir");

    twinsync()
        .arg(dst.path().join("missing"))
        .arg(dst.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source folder path"));
}

#[test]
fn test_delete_orphans_without_one_direction_fails() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .arg("--delete-orphans")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--delete-orphans can be used only in combination with --one-direction-sync",
        ));
}

#[test]
fn test_dry_run_prints_actions_and_changes_nothing() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(&src.path().join("a.txt"), b"a", 1_000);
    write(&dst.path().join("orphan.txt"), b"o", 1_000);

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .args(["--one-direction-sync", "--delete-orphans", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DryRun: copy"))
        .stdout(predicate::str::contains("DryRun: remove"))
        .stdout(predicate::str::contains("Dry-run mode: no changes were made."));

    assert!(!dst.path().join("a.txt").exists());
    assert!(dst.path().join("orphan.txt").exists());
}

#[test]
fn test_summary_prints_table() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(&src.path().join("a.txt"), b"a", 1_000);

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .args(["--summary", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync direction"))
        .stdout(predicate::str::contains("SOURCE --> TARGET"))
        .stdout(predicate::str::contains("a.txt"));
}

#[test]
fn test_sync_succeeds_and_reports_done() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(&src.path().join("a.txt"), b"a", 1_000);

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .args(["--max-workers", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync started at"))
        .stdout(predicate::str::contains("Done at"));

    assert_eq!(fs::read(dst.path().join("a.txt")).expect("read copy"), b"a");
}

#[test]
fn test_conflict_exits_non_zero() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(&src.path().join("clash.bin"), b"0123456789", 1_000);
    write(&dst.path().join("clash.bin"), b"01234", 1_000);

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("clash.bin"));

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .arg("--skip-conflicts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous conflict"));
}

#[test]
fn test_config_file_supplies_options() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    let cfg = TempDir::new().expect("create config tempdir");
    write(&src.path().join("keep.txt"), b"k", 1_000);
    write(&src.path().join("skip.log"), b"l", 1_000);

    let config_path = cfg.path().join("twinsync.toml");
    fs::write(&config_path, "exclude_file_ext = [\"log\"]\n").expect("write config");

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    assert!(dst.path().join("keep.txt").exists());
    assert!(!dst.path().join("skip.log").exists());
}

#[test]
fn test_unknown_config_key_fails() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    let cfg = TempDir::new().expect("create config tempdir");
    let config_path = cfg.path().join("twinsync.toml");
    fs::write(&config_path, "no_such_option = true\n").expect("write config");

    twinsync()
        .arg(src.path())
        .arg(dst.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure();
}
