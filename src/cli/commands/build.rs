//! Build command implementation
//!
//! Implements `repack build`: loads the spec, resolves the configuration,
//! and hands the package entries to the pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builders::BuilderRegistry;
use crate::cli::output::{print_detail, print_success, print_warning};
use crate::core::config::{self, ResolveOptions};
use crate::core::pipeline::{BuildReport, Pipeline};
use crate::core::spec::Spec;

/// Build options
pub struct BuildOptions {
    /// Directory receiving the built artifacts
    pub output_dir: PathBuf,
    /// Keep scratch directories after the run
    pub no_clean: bool,
    /// Package format filter (`all` or a builder id)
    pub format: String,
    /// Active build profile
    pub profile: Option<String>,
    /// Preserve symlinks when copying the payload tree
    pub preserve_symlinks: bool,
    /// Copy the payload tree without preserving file permissions
    pub no_preserve_permissions: bool,
    /// Print a machine-readable build summary
    pub json: bool,
}

/// Execute the build command
pub async fn execute(spec_path: &Path, options: BuildOptions) -> Result<()> {
    let spec = Spec::load(spec_path)?;

    tracing::info!("Building packages for '{}'", spec.name);

    let registry = BuilderRegistry::with_default_builders();
    let resolve_opts = ResolveOptions {
        output_dir: options.output_dir,
        preserve_symlinks: options.preserve_symlinks,
        preserve_permissions: !options.no_preserve_permissions,
        format: options.format,
        profile: options.profile,
        no_clean: options.no_clean,
    };
    let config = config::resolve(&spec, &registry, &resolve_opts)?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let report = Pipeline::new(&spec, &config, &registry).run()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_report(&report);
    Ok(())
}

/// Human-readable run summary
fn display_report(report: &BuildReport) {
    for artifact in &report.built {
        print_success(&format!(
            "Built {} ({} {})",
            artifact.filename, artifact.format, artifact.version
        ));
    }
    for skipped in &report.skipped {
        print_detail(&format!("skipped {}: {}", skipped.format, skipped.reason));
    }
    for failed in &report.failed {
        print_warning(&format!("{} failed: {}", failed.format, failed.error));
    }
    for dir in &report.kept_scratch {
        print_detail(&format!("kept {}", dir.display()));
    }

    println!();
    if report.built.is_empty() {
        print_warning("No packages were built");
    } else {
        print_success("Build complete");
        print_detail(&format!("Packages built: {}", report.built.len()));
    }
}
