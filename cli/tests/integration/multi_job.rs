//! Runs with several job files.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_jobs_run_in_order() {
    let fx = TestFixture::new();
    fx.write_src("one.txt", b"1");
    fx.write_src("two.txt", b"22");
    let first = fx.write_job("first", &fx.local_job(&[("one.txt", "one.txt")], &[], 8));
    let second = fx.write_job("second", &fx.local_job(&[("two.txt", "two.txt")], &[], 8));

    let output = cargo_bin_cmd!("ferry")
        .arg(&first)
        .arg(&second)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let positions: Vec<usize> = [
        "Initiating backup 1 of 2:",
        "Backup 1 of 2 complete",
        "Initiating backup 2 of 2:",
        "Backup 2 of 2 complete",
        "All 2 backups complete: 2 files (3 B)",
    ]
    .iter()
    .map(|line| stdout.find(line).unwrap_or_else(|| panic!("missing {line:?} in:\n{stdout}")))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order:\n{stdout}");

    fx.assert_file_content(&fx.dst.path().join("one.txt"), "1");
    fx.assert_file_content(&fx.dst.path().join("two.txt"), "22");
}

#[test]
fn test_later_job_overwrites_earlier_output() {
    let fx = TestFixture::new();
    fx.write_src("long.txt", b"a much longer body");
    fx.write_src("short.txt", b"tiny");
    let first = fx.write_job("first", &fx.local_job(&[("long.txt", "out.txt")], &[], 5));
    let second = fx.write_job("second", &fx.local_job(&[("short.txt", "out.txt")], &[], 5));

    cargo_bin_cmd!("ferry").arg(&first).arg(&second).assert().success();

    fx.assert_file_content(&fx.dst.path().join("out.txt"), "tiny");
}

#[test]
fn test_failing_job_stops_the_run() {
    let fx = TestFixture::new();
    fx.write_src("ok.txt", b"ok");
    let good = fx.write_job("good", &fx.local_job(&[("ok.txt", "ok.txt")], &[], 8));
    let bad = fx.write_job("bad", &fx.local_job(&[("missing.txt", "missing.txt")], &[], 8));
    let never = fx.write_job("never", &fx.local_job(&[("ok.txt", "never.txt")], &[], 8));

    cargo_bin_cmd!("ferry")
        .arg(&good)
        .arg(&bad)
        .arg(&never)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Backup 1 of 3 complete"))
        .stdout(predicate::str::contains("Initiating backup 2 of 3:"))
        .stdout(predicate::str::contains("Initiating backup 3 of 3").not())
        .stderr(predicate::str::contains("Backup 2 of 3 failed"));

    fx.assert_file_content(&fx.dst.path().join("ok.txt"), "ok");
    assert!(!fx.dst.path().join("never.txt").exists());
}

#[test]
fn test_bad_job_file_after_good_one() {
    let fx = TestFixture::new();
    fx.write_src("ok.txt", b"ok");
    let good = fx.write_job("good", &fx.local_job(&[("ok.txt", "ok.txt")], &[], 8));
    let broken = fx.jobs.path().join("broken.json");
    fs::write(&broken, "not json at all").unwrap();

    cargo_bin_cmd!("ferry")
        .arg(&good)
        .arg(&broken)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken.json"));

    fx.assert_file_content(&fx.dst.path().join("ok.txt"), "ok");
}
