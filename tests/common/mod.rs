//! Test helpers
//!
//! Per-process scratch paths under the system temp directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Scratch directory removed on drop
pub struct Scratch {
    root: PathBuf,
}

impl Scratch {
    /// Create a fresh directory named after the test and the process id.
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("fsio_it_{}_{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `name` inside the scratch directory, as a `String`
    pub fn path(&self, name: &str) -> String {
        self.root.join(name).to_string_lossy().into_owned()
    }

    /// Create a file with `content` and return its path.
    pub fn file(&self, name: &str, content: &[u8]) -> String {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn dir(&self, name: &str) -> String {
        let path = self.path(name);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
