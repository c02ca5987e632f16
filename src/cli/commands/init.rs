//! Init command implementation
//!
//! Implements `repack init` to scaffold a starter spec and distribution
//! directory in the current directory.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_detail, print_success};
use crate::core::init::{self, InitOptions, SPEC_FILENAME};

/// Execute the init command
pub async fn execute(path: &Path, name: Option<String>, force: bool) -> Result<()> {
    let options = InitOptions { name, force };

    let result = init::create_project(path, &options)
        .with_context(|| format!("Failed to scaffold project in {}", path.display()))?;

    print_success(&format!(
        "Initialized '{}' in {}",
        result.name,
        path.display()
    ));
    print_detail(&format!("Created {SPEC_FILENAME}"));
    print_detail(&format!("Created {}", result.dist_dir.display()));
    print_detail(&format!(
        "Fill the distribution directory, then run 'repack build {SPEC_FILENAME}'"
    ));

    Ok(())
}
