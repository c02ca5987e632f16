//! Package spec (repack.yaml) parsing and validation
//!
//! The spec is the declarative input of a repack run: package metadata, the
//! list of requested package variants, and the optional `pkgbuild` settings
//! block. Loaded once, read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::SpecError;

/// A package specification document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spec {
    /// Package name
    pub name: String,

    /// Package version (environment override may replace it)
    #[serde(default)]
    pub version: Option<String>,

    /// Package release (environment override may replace it)
    #[serde(default)]
    pub release: Option<String>,

    /// Maintainer name and email
    #[serde(default)]
    pub maintainer: Option<String>,

    /// One-line summary
    #[serde(default)]
    pub summary: Option<String>,

    /// Long description (may span paragraphs)
    #[serde(default)]
    pub description: Option<String>,

    /// Path to the prebuilt payload tree; falls back to the dist directory
    #[serde(default)]
    pub packagetree: Option<String>,

    /// Maintainer scripts: slot name (preinst, postinst, prerm, postrm)
    /// to script file path
    #[serde(default)]
    pub scripts: HashMap<String, String>,

    /// Requested package variants, in build order
    pub packages: Vec<PackageEntry>,

    /// Build settings block
    #[serde(default)]
    pub pkgbuild: PkgBuild,
}

/// One requested package variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PackageEntry {
    /// Builder identifier (`debian`, `rpm`)
    pub package: String,

    /// Target architecture; `system` resolves to the host
    #[serde(default = "default_architecture")]
    pub architecture: String,

    /// Comma-separated runtime dependencies; `${package_version}` expands
    /// to the resolved version
    #[serde(default)]
    pub requires: Option<String>,

    /// Comma-separated extra provides
    #[serde(default)]
    pub provides: Option<String>,

    /// Comma-separated conflicting packages
    #[serde(default)]
    pub conflicts: Option<String>,

    /// Comma-separated replaced packages
    #[serde(default)]
    pub replaces: Option<String>,

    /// Comma-separated pre-dependencies
    #[serde(default)]
    pub predepends: Option<String>,

    /// Comma-separated lintian overrides
    #[serde(default)]
    pub lintian_overrides: Option<String>,

    /// Regex limiting which resolved versions build this entry
    /// (matched against the start of the version string)
    #[serde(default)]
    pub pkg_version: Option<String>,

    /// Build only when this matches the active profile
    #[serde(default)]
    pub profile: Option<String>,

    /// Keep going after a builder failure for this entry
    #[serde(default)]
    pub continue_on_error: bool,
}

fn default_architecture() -> String {
    "system".to_string()
}

impl Default for PackageEntry {
    fn default() -> Self {
        Self {
            package: String::new(),
            architecture: default_architecture(),
            requires: None,
            provides: None,
            conflicts: None,
            replaces: None,
            predepends: None,
            lintian_overrides: None,
            pkg_version: None,
            profile: None,
            continue_on_error: false,
        }
    }
}

/// The `pkgbuild` settings block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PkgBuild {
    /// Preserve symlinks when copying the payload tree
    #[serde(default)]
    pub preserve_symlinks: Option<bool>,

    /// Preserve file permissions when copying the payload tree
    #[serde(default)]
    pub preserve_permissions: Option<bool>,

    /// Directory holding the prebuilt file tree
    #[serde(default)]
    pub dist_directory: Option<String>,

    /// Executable run before each entry to refresh the dist tree
    #[serde(default)]
    pub pkg_update_dist: Option<String>,

    /// Executable run to tag/publish a release
    #[serde(default)]
    pub pkg_release_hooks: Option<String>,

    /// Tag passed to the release hook
    #[serde(default)]
    pub pkg_release_tag: Option<String>,

    /// Executable run to build the payload before packaging
    #[serde(default)]
    pub pkg_build_package: Option<String>,

    /// Argument string passed to the build hook
    #[serde(default)]
    pub pkg_build_args: Option<String>,

    /// Honor `<name>_version` / `<name>_release` environment overrides
    #[serde(default = "default_env_overrides")]
    pub env_overrides: bool,

    /// Version store path override
    #[serde(default)]
    pub version_db: Option<String>,
}

fn default_env_overrides() -> bool {
    true
}

impl Default for PkgBuild {
    fn default() -> Self {
        Self {
            preserve_symlinks: None,
            preserve_permissions: None,
            dist_directory: None,
            pkg_update_dist: None,
            pkg_release_hooks: None,
            pkg_release_tag: None,
            pkg_build_package: None,
            pkg_build_args: None,
            env_overrides: default_env_overrides(),
            version_db: None,
        }
    }
}

impl Spec {
    /// Load a spec from a YAML file
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpecError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SpecError::Read {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        })?;

        let spec = Self::from_yaml(&content).map_err(|e| SpecError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        spec.validate()?;
        Ok(spec)
    }

    /// Parse a spec from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize the spec to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check structural requirements serde cannot express
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.trim().is_empty() {
            return Err(SpecError::MissingField {
                field: "name".to_string(),
            });
        }
        Ok(())
    }
}
