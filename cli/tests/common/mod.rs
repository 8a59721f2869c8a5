//! Common test utilities for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture with source and destination directories plus a place for
/// job files.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
    pub jobs: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
            jobs: TempDir::new().expect("Failed to create temp job dir"),
        }
    }

    /// Absolute source path for `rel`, as a job file string.
    pub fn src_path(&self, rel: &str) -> String {
        path_string(&self.src.path().join(rel))
    }

    /// Absolute destination path for `rel`, as a job file string.
    pub fn dst_path(&self, rel: &str) -> String {
        path_string(&self.dst.path().join(rel))
    }

    /// Write a source file, creating parent directories.
    pub fn write_src(&self, rel: &str, content: &[u8]) {
        let path = self.src.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    /// Create a nested directory structure with files below `root`.
    pub fn create_nested_structure(&self, root: &str, depth: usize, files_per_level: usize) {
        let mut current = PathBuf::from(root);
        for level in 0..depth {
            current = current.join(format!("level{}", level));
            for i in 0..files_per_level {
                let rel = current.join(format!("file{}.txt", i));
                self.write_src(
                    &rel.to_string_lossy(),
                    format!("content at level {} #{}", level, i).as_bytes(),
                );
            }
        }
    }

    /// Write `job` to `<name>.json` in the job directory.
    pub fn write_job(&self, name: &str, job: &Value) -> PathBuf {
        let path = self.jobs.path().join(format!("{name}.json"));
        fs::write(&path, serde_json::to_string_pretty(job).expect("Failed to encode job"))
            .expect("Failed to write job file");
        path
    }

    /// Local-to-local job with the given file and folder pairs.
    pub fn local_job(
        &self,
        files: &[(&str, &str)],
        folders: &[(&str, &str)],
        maxbytes: u64,
    ) -> Value {
        let pairs = |list: &[(&str, &str)]| -> Vec<Value> {
            list.iter()
                .map(|(from, to)| json!({ "from": self.src_path(from), "to": self.dst_path(to) }))
                .collect()
        };
        json!({
            "from": "local",
            "to": "local",
            "files": pairs(files),
            "folders": pairs(folders),
            "maxbytes": maxbytes,
        })
    }

    /// Count all files in a directory recursively.
    pub fn count_files_recursive(&self, dir: &Path) -> usize {
        let mut count = 0;
        if dir.is_dir() {
            for entry in fs::read_dir(dir).expect("Failed to read directory") {
                let path = entry.expect("Failed to read entry").path();
                if path.is_dir() {
                    count += self.count_files_recursive(&path);
                } else {
                    count += 1;
                }
            }
        }
        count
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
