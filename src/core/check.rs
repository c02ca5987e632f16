//! Check command logic
//!
//! Validates a spec and its resolved configuration and reports what would
//! be built, without running hooks or builders.

use crate::builders::BuilderRegistry;
use crate::core::config::{self, Configuration, ResolveOptions};
use crate::core::hooks::hook_exists;
use crate::core::pipeline::entry_skip_reason;
use crate::core::spec::Spec;

/// Result of the check operation
#[derive(Debug)]
pub struct CheckResult {
    /// Whether the configuration resolved
    pub config_valid: bool,
    /// Whether the packaging tools for the buildable entries are on PATH
    pub tools_available: bool,
    /// Formats that would build, in entry order
    pub entries_to_build: Vec<String>,
    /// Entries the filters would exclude, with reasons
    pub entries_skipped: Vec<String>,
    /// Warnings encountered during check
    pub warnings: Vec<String>,
}

impl CheckResult {
    /// Create a new check result
    pub fn new() -> Self {
        Self {
            config_valid: true,
            tools_available: true,
            entries_to_build: Vec::new(),
            entries_skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the spec would build
    pub fn is_valid(&self) -> bool {
        self.config_valid
    }
}

impl Default for CheckResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a spec without building
///
/// Resolves the configuration, applies the entry filters, and verifies
/// the configured hooks and packaging tools exist. Nothing is executed
/// and nothing is written.
pub fn check(spec: &Spec, registry: &BuilderRegistry, options: &ResolveOptions) -> CheckResult {
    let mut result = CheckResult::new();

    let config = match config::resolve(spec, registry, options) {
        Ok(config) => config,
        Err(e) => {
            result.config_valid = false;
            result.warnings.push(e.to_string());
            return result;
        }
    };

    for entry in &spec.packages {
        match entry_skip_reason(&config, registry, entry) {
            None => result.entries_to_build.push(entry.package.clone()),
            Some(reason) => result
                .entries_skipped
                .push(format!("{}: {reason}", entry.package)),
        }
    }

    if result.entries_to_build.is_empty() {
        result
            .warnings
            .push("No package entry would build".to_string());
    }

    check_hooks(&config, &mut result);
    check_payload(spec, &config, &mut result);
    let to_build = result.entries_to_build.clone();
    check_tools(&to_build, &mut result);

    result
}

/// Warn about configured hooks whose executables are missing
fn check_hooks(config: &Configuration, result: &mut CheckResult) {
    let hooks = [
        ("update-dist", &config.update_dist_hook),
        ("release", &config.release_hook),
        ("build-package", &config.build_pkg_hook),
    ];
    for (name, path) in hooks {
        if let Some(path) = path {
            if !hook_exists(path) {
                result
                    .warnings
                    .push(format!("{name} hook '{}' not found", path.display()));
            }
        }
    }
}

/// Warn when no payload source exists (the build degenerates to a meta package)
fn check_payload(spec: &Spec, config: &Configuration, result: &mut CheckResult) {
    if spec.packagetree.is_some() {
        return;
    }
    if !config.dist_directory.is_dir() {
        result.warnings.push(format!(
            "Distribution directory '{}' not found; packages would be empty",
            config.dist_directory.display()
        ));
    }
}

/// Warn about missing external packaging tools
fn check_tools(formats: &[String], result: &mut CheckResult) {
    if formats.is_empty() {
        return;
    }

    if which::which("fakeroot").is_err() {
        result.tools_available = false;
        result.warnings.push("fakeroot not found in PATH".to_string());
    }

    for format in formats {
        if let Some(tool) = packaging_tool(format) {
            if which::which(tool).is_err() {
                result.tools_available = false;
                result.warnings.push(format!("{tool} not found in PATH"));
            }
        }
    }
}

/// External tool behind a built-in format id
fn packaging_tool(format: &str) -> Option<&'static str> {
    match format {
        "debian" => Some("dpkg-deb"),
        "rpm" => Some("rpmbuild"),
        _ => None,
    }
}
