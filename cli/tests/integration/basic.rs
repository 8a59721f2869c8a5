//! Basic functionality integration tests for the ferry CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;

#[test]
fn test_single_file_job() {
    let fx = TestFixture::new();
    fx.write_src("notes.txt", b"hello world");
    let job = fx.write_job("job", &fx.local_job(&[("notes.txt", "backup/notes.txt")], &[], 4));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initiating backup 1 of 1:"))
        .stdout(predicate::str::contains("Backup 1 of 1 complete: 1 file (11 B)"));

    fx.assert_file_content(&fx.dst.path().join("backup/notes.txt"), "hello world");
}

#[test]
fn test_ten_bytes_in_chunks_of_four() {
    let fx = TestFixture::new();
    fx.write_src("abc.txt", b"abcdefghij");
    let job = fx.write_job("job", &fx.local_job(&[("abc.txt", "abc.txt")], &[], 4));

    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    assert_eq!(fs::read(fx.dst.path().join("abc.txt")).unwrap(), b"abcdefghij");
}

#[test]
fn test_folder_job_copies_every_nested_file() {
    let fx = TestFixture::new();
    fx.create_nested_structure("tree", 5, 3);
    let job = fx.write_job("job", &fx.local_job(&[], &[("tree", "mirror")], 7));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .success()
        .stdout(predicate::str::contains("15 files"));

    assert_eq!(fx.count_files_recursive(&fx.dst.path().join("mirror")), 15);
    fx.assert_file_content(
        &fx.dst.path().join("mirror/level0/level1/level2/file1.txt"),
        "content at level 2 #1",
    );
}

#[test]
fn test_files_before_folders() {
    let fx = TestFixture::new();
    fx.write_src("single.txt", b"single");
    fx.write_src("dir/a.txt", b"a");
    let job = fx.write_job(
        "job",
        &fx.local_job(&[("single.txt", "out/single.txt")], &[("dir", "out/dir")], 1024),
    );

    let output = cargo_bin_cmd!("ferry")
        .args(["--verbose", "--quiet"])
        .arg(&job)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let single = stdout.find("single.txt ->").unwrap();
    let folder = stdout.find("a.txt ->").unwrap();
    assert!(single < folder, "explicit files must be copied first:\n{stdout}");
}

#[test]
fn test_empty_file_creates_empty_destination() {
    let fx = TestFixture::new();
    fx.write_src("empty.bin", b"");
    let job = fx.write_job("job", &fx.local_job(&[("empty.bin", "empty.bin")], &[], 8));

    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    let dst = fx.dst.path().join("empty.bin");
    assert!(dst.is_file());
    assert_eq!(fs::metadata(dst).unwrap().len(), 0);
}

#[test]
fn test_rerun_overwrites_instead_of_appending() {
    let fx = TestFixture::new();
    fx.write_src("data.txt", b"0123456789");
    let job = fx.write_job("job", &fx.local_job(&[("data.txt", "data.txt")], &[], 3));

    cargo_bin_cmd!("ferry").arg(&job).assert().success();
    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    fx.assert_file_content(&fx.dst.path().join("data.txt"), "0123456789");
}

#[test]
fn test_existing_destination_is_replaced() {
    let fx = TestFixture::new();
    fx.write_src("data.txt", b"new");
    fs::write(fx.dst.path().join("data.txt"), "old content that is longer").unwrap();
    let job = fx.write_job("job", &fx.local_job(&[("data.txt", "data.txt")], &[], 2));

    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    fx.assert_file_content(&fx.dst.path().join("data.txt"), "new");
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(4096)]
#[case(1 << 20)]
fn test_binary_round_trip(#[case] maxbytes: u64) {
    let fx = TestFixture::new();
    let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fx.write_src("blob.bin", &data);
    let job = fx.write_job("job", &fx.local_job(&[("blob.bin", "blob.bin")], &[], maxbytes));

    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    assert_eq!(fs::read(fx.dst.path().join("blob.bin")).unwrap(), data);
}

#[test]
fn test_default_job_file_is_config_json() {
    let fx = TestFixture::new();
    fx.write_src("notes.txt", b"defaults");
    let job = fx.local_job(&[("notes.txt", "notes.txt")], &[], 16);
    fs::write(fx.jobs.path().join("config.json"), job.to_string()).unwrap();

    cargo_bin_cmd!("ferry")
        .current_dir(fx.jobs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initiating backup 1 of 1: config.json"));

    fx.assert_file_content(&fx.dst.path().join("notes.txt"), "defaults");
}

#[test]
fn test_unknown_backend_type_falls_back_to_local() {
    let fx = TestFixture::new();
    fx.write_src("notes.txt", b"fallback");
    let mut job = fx.local_job(&[("notes.txt", "notes.txt")], &[], 16);
    job["to"] = serde_json::json!("carrier-pigeon");
    let job = fx.write_job("job", &job);

    cargo_bin_cmd!("ferry").arg(&job).assert().success();

    fx.assert_file_content(&fx.dst.path().join("notes.txt"), "fallback");
}
