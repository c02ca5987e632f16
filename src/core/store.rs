//! Version store
//!
//! Persists the last successfully built version per package across runs,
//! as a flat file of `key=value` lines. The store is best-effort: a run
//! whose store cannot be opened continues with persistence disabled, and
//! entries are only written after a package variant builds successfully.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Derive a store or environment key from a package name
///
/// Every non-alphanumeric character becomes `_`, then the suffix is
/// appended: `my-app` with `_version` gives `my_app_version`.
pub fn derived_key(name: &str, suffix: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{normalized}{suffix}")
}

/// On-disk mapping from derived package key to last-built version
#[derive(Debug)]
pub struct VersionStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl VersionStore {
    /// Open the store, creating the backing file's directory if needed
    ///
    /// Unparseable lines in an existing file are skipped, not fatal; a
    /// store rewritten by [`flush`](Self::flush) sheds them.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        }

        let mut entries = BTreeMap::new();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                for line in content.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((key, value)) = line.split_once('=') {
                        entries.insert(key.trim().to_string(), value.trim().to_string());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::Open {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the last recorded version for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a version under a key and persist immediately
    pub fn record(&mut self, key: String, value: String) -> Result<(), StoreError> {
        self.entries.insert(key, value);
        self.flush()
    }

    /// Rewrite the backing file from the in-memory entries
    ///
    /// Writes to a sibling temp file first, then renames over the store,
    /// so a crash never leaves a half-written file.
    pub fn flush(&self) -> Result<(), StoreError> {
        let mut content = String::new();
        for (key, value) in &self.entries {
            content.push_str(key);
            content.push('=');
            content.push_str(value);
            content.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &content).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }
}
