//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create an executable script in the test project
    #[allow(dead_code)]
    pub fn create_executable(&self, name: &str, content: &str) {
        self.create_file(name, content);
        let path = self.dir.path().join(name);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
    }

    /// Create a directory in the test project
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample spec building one debian package from DIST/
#[allow(dead_code)]
pub const SAMPLE_SPEC: &str = r#"
name: sample
version: "1.2.3"
release: "1"
maintainer: Test <test@example.com>
summary: Sample package
description: |
  A sample package used by the integration tests.
packages:
  - package: debian
    architecture: 64bit
"#;
