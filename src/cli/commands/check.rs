//! Check command implementation
//!
//! Implements `repack check` to validate a spec without building.

use std::path::Path;

use anyhow::{bail, Result};

use crate::builders::BuilderRegistry;
use crate::cli::output::{print_success, status};
use crate::core::check;
use crate::core::config::ResolveOptions;
use crate::core::spec::Spec;

/// Execute the check command
pub async fn execute(spec_path: &Path, format: String, profile: Option<String>) -> Result<()> {
    let spec = Spec::load(spec_path)?;

    tracing::info!("Checking '{}'", spec.name);

    let registry = BuilderRegistry::with_default_builders();
    let options = ResolveOptions {
        format,
        profile,
        ..ResolveOptions::default()
    };
    let result = check::check(&spec, &registry, &options);

    if result.config_valid {
        println!("{} Configuration resolves", status::SUCCESS);
    } else {
        println!("{} Configuration has errors", status::ERROR);
    }

    if !result.entries_to_build.is_empty() {
        println!("\nPackages that would be built:");
        for format in &result.entries_to_build {
            println!("  • {format}");
        }
    }

    if !result.entries_skipped.is_empty() {
        println!("\nSkipped entries:");
        for entry in &result.entries_skipped {
            println!("  • {entry}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  {} {warning}", status::WARNING);
        }
    }

    println!();
    if result.is_valid() {
        print_success("Check passed");
        Ok(())
    } else {
        bail!("Check failed: fix the issues above before building");
    }
}
