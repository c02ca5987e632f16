//! Project scaffolding logic
//!
//! Business logic for `repack init`: generates a commented starter spec
//! and the distribution directory a new project builds from.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::spec::Spec;
use crate::error::InitError;

/// Filename of the generated starter spec
pub const SPEC_FILENAME: &str = "package.yml";

/// Options for project scaffolding
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Package name (defaults to the directory name)
    pub name: Option<String>,
    /// Overwrite an existing spec file
    pub force: bool,
}

/// Result of scaffolding
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created spec file
    pub spec_path: PathBuf,
    /// Path to the created distribution directory
    pub dist_dir: PathBuf,
    /// Package name written into the spec
    pub name: String,
}

/// Generate the starter spec content with comments
pub fn generate_spec_content(name: &str) -> String {
    format!(
        r#"# repack package specification
name: "{name}"
version: "0.1.0"
release: "1"
# maintainer: "you <you@example.org>"
summary: "{name} packaged with repack"
description: |
  Longer description of {name}.

  Second paragraph.

# Files to package; defaults to the distribution directory when omitted.
# packagetree: "DIST/"

# Maintainer scripts, copied into the package:
# scripts:
#   postinst: "scripts/postinst.sh"
#   prerm: "scripts/prerm.sh"

packages:
  - package: debian
    architecture: system
    # requires: "libc6"
    # provides: "virtual-{name}"
  # - package: rpm
  #   architecture: system

pkgbuild:
  env-overrides: true
  # dist-directory: "DIST/"
  # pkg-update-dist: "scripts/update-dist.sh"
  # pkg-release-hooks: "scripts/release.sh"
  # pkg-build-package: "scripts/build.sh"
"#
    )
}

/// Derive the package name from the target directory
pub fn derive_package_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(ToString::to_string)
        .unwrap_or_else(|| "my-package".to_string())
}

/// Validate scaffolding can proceed
pub fn validate_init(path: &Path, options: &InitOptions) -> Result<(), InitError> {
    if !path.exists() {
        return Err(InitError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }

    let spec_path = path.join(SPEC_FILENAME);
    if spec_path.exists() && !options.force {
        return Err(InitError::SpecExists { path: spec_path });
    }

    Ok(())
}

/// Write the starter spec and create the distribution directory
pub fn create_project(path: &Path, options: &InitOptions) -> Result<InitResult, InitError> {
    validate_init(path, options)?;

    let name = options
        .name
        .clone()
        .unwrap_or_else(|| derive_package_name(path));

    let spec_path = path.join(SPEC_FILENAME);
    std::fs::write(&spec_path, generate_spec_content(&name)).map_err(|e| InitError::IoError {
        path: spec_path.clone(),
        error: e.to_string(),
    })?;

    let dist_dir = path.join(defaults::DIST_DIRECTORY);
    std::fs::create_dir_all(&dist_dir).map_err(|e| InitError::IoError {
        path: dist_dir.clone(),
        error: e.to_string(),
    })?;

    Ok(InitResult {
        spec_path,
        dist_dir,
        name,
    })
}

/// Parse the generated content back (for validation)
pub fn parse_spec(content: &str) -> Result<Spec, InitError> {
    Spec::from_yaml(content).map_err(|e| InitError::IoError {
        path: PathBuf::from(SPEC_FILENAME),
        error: e.to_string(),
    })
}
