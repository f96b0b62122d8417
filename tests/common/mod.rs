//! Test helpers for integration tests.
//!
//! Provides a fixture tree mirroring a small project directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary workspace holding a `tmp` fixture directory.
pub struct Fixture {
    pub workspace: TempDir,
}

impl Fixture {
    /// Create `tmp/` with two files and one subdirectory containing a file.
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("create temp dir");
        let tmp = workspace.path().join("tmp");
        fs::create_dir_all(tmp.join("sub")).expect("create fixture dirs");
        fs::write(tmp.join("test.txt"), b"test").expect("write test.txt");
        fs::write(tmp.join("data.csv"), b"a,b\n1,2\n").expect("write data.csv");
        fs::write(tmp.join("sub").join("inner.md"), b"# inner").expect("write inner.md");
        Self { workspace }
    }

    /// Path of the fixture directory.
    pub fn tmp(&self) -> PathBuf {
        self.workspace.path().join("tmp")
    }

    /// Create an empty directory inside the workspace.
    pub fn make_dir(&self, name: &str) -> PathBuf {
        let path = self.workspace.path().join(name);
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Write a file inside the workspace, outside the fixture directory.
    pub fn incoming(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.workspace.path().join(name);
        fs::write(&path, content).expect("write incoming file");
        path
    }
}

/// Path as the string form accepted by `Dir::open`.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
