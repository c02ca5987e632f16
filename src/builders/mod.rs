//! Package format builders
//!
//! Each supported package format implements the [`Builder`] trait: generate
//! the artifact filename, materialize a scratch tree with payload and
//! format metadata, and drive the external packaging tool. The pipeline is
//! polymorphic over the [`BuilderRegistry`], a static map assembled at
//! startup; there is no runtime plugin discovery.

pub mod debian;
pub mod rpm;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::config::Configuration;
use crate::core::spec::{PackageEntry, Spec};
use crate::error::{BuilderError, FilesystemError};

/// Contract every package format implements
pub trait Builder {
    /// Registry identifier, matched against a package entry's `package`
    fn id(&self) -> &'static str;

    /// Deterministic artifact filename for one entry
    fn filenamegen(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<String, BuilderError>;

    /// Materialize the scratch tree: payload plus format metadata
    ///
    /// Ownership of the returned directory passes to the caller, which
    /// removes it during cleanup.
    fn tree(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<PathBuf, BuilderError>;

    /// Produce `filename` under `config.output_dir` from the scratch tree
    fn build(
        &self,
        build_dir: &Path,
        filename: &str,
        config: &Configuration,
    ) -> Result<(), BuilderError>;
}

/// Builder lookup table, assembled once before the pipeline runs
pub struct BuilderRegistry {
    builders: BTreeMap<String, Box<dyn Builder>>,
}

impl BuilderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in `debian` and `rpm` builders
    pub fn with_default_builders() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(debian::DebianBuilder::new()));
        registry.register(Box::new(rpm::RpmBuilder::new()));
        registry
    }

    /// Add a builder under its own id
    pub fn register(&mut self, builder: Box<dyn Builder>) {
        self.builders.insert(builder.id().to_string(), builder);
    }

    /// Look up a builder by format id
    pub fn get(&self, id: &str) -> Option<&dyn Builder> {
        self.builders.get(id).map(Box::as_ref)
    }

    /// True when a builder is registered under `id`
    pub fn contains(&self, id: &str) -> bool {
        self.builders.contains_key(id)
    }

    /// Registered format ids, sorted
    pub fn ids(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::with_default_builders()
    }
}

/// Payload tree for an entry
///
/// The spec's `packagetree` wins; otherwise the resolved dist directory is
/// used when it exists. `None` means a meta package without payload.
pub(crate) fn payload_source(spec: &Spec, config: &Configuration) -> Option<PathBuf> {
    if let Some(tree) = &spec.packagetree {
        return Some(PathBuf::from(tree));
    }
    if config.dist_directory.is_dir() {
        return Some(config.dist_directory.clone());
    }
    None
}

/// Create a pipeline-owned scratch directory
pub(crate) fn scratch_dir() -> Result<PathBuf, BuilderError> {
    let dir = tempfile::Builder::new()
        .prefix("repack-")
        .tempdir()
        .map_err(|e| {
            BuilderError::Filesystem(FilesystemError::Scratch {
                error: e.to_string(),
            })
        })?;
    Ok(dir.into_path())
}

/// Warn when the external packaging tool is not on PATH
pub(crate) fn warn_missing_tool(tool: &str) {
    if which::which(tool).is_err() {
        tracing::warn!("'{tool}' not found in PATH, the build step will fail");
    }
}
