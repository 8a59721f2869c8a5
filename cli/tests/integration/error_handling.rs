//! Error handling integration tests for the ferry CLI.
//!
//! Every failure is fatal: the run stops, the process exits with status 1,
//! and stderr carries `error[<category>]: <message>`.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use serde_json::json;
use std::fs;

#[test]
fn test_missing_job_file() {
    let fx = TestFixture::new();

    cargo_bin_cmd!("ferry")
        .arg(fx.jobs.path().join("absent.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[configuration]"))
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn test_missing_default_config_json() {
    let fx = TestFixture::new();

    cargo_bin_cmd!("ferry")
        .current_dir(fx.jobs.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_malformed_json() {
    let fx = TestFixture::new();
    let job = fx.jobs.path().join("broken.json");
    fs::write(&job, "{ \"from\": \"local\", ").unwrap();

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[configuration]"));
}

#[test]
fn test_zero_maxbytes_rejected_before_copying() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", b"abc");
    let job = fx.write_job("job", &fx.local_job(&[("a.txt", "a.txt")], &[], 0));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("maxbytes"));

    assert!(!fx.dst.path().join("a.txt").exists());
}

#[test]
fn test_missing_maxbytes_rejected() {
    let fx = TestFixture::new();
    let job = fx.write_job("job", &json!({ "from": "local", "to": "local" }));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("maxbytes"));
}

#[test]
fn test_missing_source_file_stops_job() {
    let fx = TestFixture::new();
    fx.write_src("first.txt", b"first");
    fx.write_src("third.txt", b"third");
    let job = fx.write_job(
        "job",
        &fx.local_job(
            &[
                ("first.txt", "first.txt"),
                ("second.txt", "second.txt"),
                ("third.txt", "third.txt"),
            ],
            &[],
            64,
        ),
    );

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[not_found]"))
        .stderr(predicate::str::contains("second.txt"));

    // Files copied before the failure stay; nothing after it is attempted.
    fx.assert_file_content(&fx.dst.path().join("first.txt"), "first");
    assert!(!fx.dst.path().join("third.txt").exists());
}

#[test]
fn test_missing_source_folder() {
    let fx = TestFixture::new();
    let job = fx.write_job("job", &fx.local_job(&[], &[("nowhere", "mirror")], 64));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[not_found]"));
}

#[test]
fn test_cloud_backend_is_unsupported() {
    let fx = TestFixture::new();
    fx.write_src("a.txt", b"abc");
    let mut job = fx.local_job(&[("a.txt", "bucket/a.txt")], &[], 64);
    job["to"] = json!("cloud");
    let job = fx.write_job("job", &job);

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[unsupported]"))
        .stderr(predicate::str::contains("cloud backend does not support"));
}

#[test]
fn test_sftp_without_address_is_configuration_error() {
    let fx = TestFixture::new();
    let mut job = fx.local_job(&[("a.txt", "/srv/a.txt")], &[], 64);
    job["to"] = json!({ "type": "sftp", "username": "u", "password": "p" });
    let job = fx.write_job("job", &job);

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[configuration]"))
        .stderr(predicate::str::contains("address"));
}

#[test]
fn test_prompt_without_terminal_fails() {
    let fx = TestFixture::new();
    let mut job = fx.local_job(&[("a.txt", "/srv/a.txt")], &[], 64);
    job["to"] = json!({
        "type": "sftp",
        "address": "127.0.0.1",
        "username": "prompt",
        "password": "prompt",
    });
    let job = fx.write_job("job", &job);

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[configuration]"))
        .stderr(predicate::str::contains("Failed to read credentials"));
}

#[test]
fn test_error_names_failing_job() {
    let fx = TestFixture::new();
    let job = fx.write_job("job", &fx.local_job(&[("ghost.txt", "ghost.txt")], &[], 64));

    cargo_bin_cmd!("ferry")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Backup 1 of 1 failed"))
        .stdout(predicate::str::contains("complete").not());
}
