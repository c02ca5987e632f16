//! Package build pipeline
//!
//! Drives one run over the spec's package entries, in order: filter
//! (format, builder, profile, version), lifecycle hooks, builder dispatch,
//! version recording. Scratch directories accumulate while entries build
//! and are removed in the terminal cleanup step, which runs on the failure
//! path as well.
//!
//! Failure policy: a hook failure aborts the whole run. A builder failure
//! aborts too, unless the entry opted into `continue-on-error`, in which
//! case it is reported and the next entry proceeds. A missing builder only
//! skips its entry.

use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use crate::builders::{Builder, BuilderRegistry};
use crate::config::defaults;
use crate::core::config::Configuration;
use crate::core::hooks::HookRunner;
use crate::core::spec::{PackageEntry, Spec};
use crate::core::store::{derived_key, VersionStore};
use crate::error::{BuilderError, RepackError};
use crate::infra::filesystem;

/// Why an entry did not build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The format filter excluded the entry
    FormatFiltered,
    /// No builder is registered for the entry's format
    BuilderMissing,
    /// The entry's profile does not match the active profile
    ProfileMismatch,
    /// The version constraint did not match the resolved version
    VersionMismatch,
    /// The version constraint is not a valid regular expression
    InvalidVersionPattern(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FormatFiltered => write!(f, "excluded by format filter"),
            Self::BuilderMissing => write!(f, "no builder registered"),
            Self::ProfileMismatch => write!(f, "profile does not match"),
            Self::VersionMismatch => write!(f, "version constraint does not match"),
            Self::InvalidVersionPattern(e) => write!(f, "invalid version pattern: {e}"),
        }
    }
}

/// One successfully built artifact
#[derive(Debug, Clone, Serialize)]
pub struct BuiltArtifact {
    /// Builder id that produced the artifact
    pub format: String,
    /// Artifact filename under the output directory
    pub filename: String,
    /// Version it was built as
    pub version: String,
}

/// An entry the filters excluded
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    /// The entry's format id
    pub format: String,
    /// Human-readable reason
    pub reason: String,
}

/// An entry whose builder failed but was allowed to continue
#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    /// The entry's format id
    pub format: String,
    /// The builder error
    pub error: String,
}

/// Outcome summary of one run
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    /// Artifacts built, in entry order
    pub built: Vec<BuiltArtifact>,
    /// Entries the filters excluded
    pub skipped: Vec<SkippedEntry>,
    /// continue-on-error entries whose builder failed
    pub failed: Vec<FailedEntry>,
    /// Scratch directories retained by no-clean or debug mode
    pub kept_scratch: Vec<PathBuf>,
}

/// One run over a spec's package entries
pub struct Pipeline<'a> {
    spec: &'a Spec,
    config: &'a Configuration,
    registry: &'a BuilderRegistry,
    scratch_dirs: Vec<PathBuf>,
    store: Option<VersionStore>,
}

impl<'a> Pipeline<'a> {
    /// Set up a run; the version store opens here with graceful degradation
    pub fn new(spec: &'a Spec, config: &'a Configuration, registry: &'a BuilderRegistry) -> Self {
        let store = match VersionStore::open(&config.version_db) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("Version persistence disabled: {e}");
                None
            }
        };

        Self {
            spec,
            config,
            registry,
            scratch_dirs: Vec::new(),
            store,
        }
    }

    /// Process every entry, then clean up
    ///
    /// Cleanup of recorded scratch directories runs on the abort path too;
    /// on abort the error is returned and no report is produced.
    pub fn run(mut self) -> Result<BuildReport, RepackError> {
        let mut report = BuildReport::default();
        let result = self.process_entries(&mut report);
        self.finalize(&mut report);
        result?;
        Ok(report)
    }

    fn process_entries(&mut self, report: &mut BuildReport) -> Result<(), RepackError> {
        for entry in &self.spec.packages {
            if let Some(reason) = entry_skip_reason(self.config, self.registry, entry) {
                report.skipped.push(SkippedEntry {
                    format: entry.package.clone(),
                    reason: reason.to_string(),
                });
                continue;
            }

            HookRunner::new(self.config).run_all()?;

            // the filter verified the builder exists
            let Some(builder) = self.registry.get(&entry.package) else {
                continue;
            };

            match self.build_entry(builder, entry) {
                Ok(artifact) => {
                    tracing::info!("Built {}", artifact.filename);
                    report.built.push(artifact);
                }
                Err(e) if entry.continue_on_error => {
                    tracing::error!("Builder for '{}' failed (continuing): {e}", entry.package);
                    report.failed.push(FailedEntry {
                        format: entry.package.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Scratch tree, filename, external build, version record
    fn build_entry(
        &mut self,
        builder: &dyn Builder,
        entry: &PackageEntry,
    ) -> Result<BuiltArtifact, BuilderError> {
        tracing::info!("Creating {} package files", builder.id());
        let dir = builder.tree(self.spec, entry, self.config)?;
        self.scratch_dirs.push(dir.clone());

        let filename = builder.filenamegen(self.spec, entry, self.config)?;
        builder.build(&dir, &filename, self.config)?;

        self.record_version(entry);

        Ok(BuiltArtifact {
            format: entry.package.clone(),
            filename,
            version: self.config.version.clone(),
        })
    }

    /// Persist the built version under the entry's derived key
    fn record_version(&mut self, entry: &PackageEntry) {
        let Some(store) = &mut self.store else {
            return;
        };

        let key = derived_key(
            &format!("{}-{}", self.spec.name, entry.package),
            defaults::VERSION_ENV_SUFFIX,
        );
        if let Err(e) = store.record(key, self.config.version.clone()) {
            tracing::warn!("Version not recorded: {e}");
        }
    }

    /// Terminal step: remove or list the scratch directories
    fn finalize(&mut self, report: &mut BuildReport) {
        if self.config.keep_scratch {
            for dir in &self.scratch_dirs {
                tracing::info!("Keeping scratch directory {}", dir.display());
            }
            report.kept_scratch = self.scratch_dirs.clone();
            return;
        }

        for dir in &self.scratch_dirs {
            tracing::debug!("Removing scratch directory {}", dir.display());
            if let Err(e) = filesystem::remove_dir_all(dir) {
                tracing::warn!("{e}");
            }
        }
    }
}

/// Apply the format, builder, profile, and version filters to one entry
pub(crate) fn entry_skip_reason(
    config: &Configuration,
    registry: &BuilderRegistry,
    entry: &PackageEntry,
) -> Option<SkipReason> {
    if !config.pkg_format.allows(&entry.package) {
        tracing::debug!("Skipping '{}' entry: format filter", entry.package);
        return Some(SkipReason::FormatFiltered);
    }

    if !registry.contains(&entry.package) {
        tracing::error!(
            "No builder for format '{}' is registered. Ignoring this package and continuing.",
            entry.package
        );
        return Some(SkipReason::BuilderMissing);
    }

    if let (Some(active), Some(wanted)) = (&config.profile, &entry.profile) {
        if active != wanted {
            tracing::debug!(
                "Skipping '{}' entry: profile '{wanted}' is not active",
                entry.package
            );
            return Some(SkipReason::ProfileMismatch);
        }
    }

    if let Some(pattern) = &entry.pkg_version {
        match Regex::new(pattern) {
            Ok(re) => {
                if !matches_prefix(&re, &config.version) {
                    tracing::debug!(
                        "Skipping '{}' entry: version '{}' does not match '{pattern}'",
                        entry.package,
                        config.version
                    );
                    return Some(SkipReason::VersionMismatch);
                }
            }
            Err(e) => {
                tracing::error!(
                    "Invalid pkg-version pattern '{pattern}' on '{}' entry: {e}",
                    entry.package
                );
                return Some(SkipReason::InvalidVersionPattern(e.to_string()));
            }
        }
    }

    None
}

/// Anchored-at-start match, the way the version constraint is interpreted
fn matches_prefix(re: &Regex, version: &str) -> bool {
    re.find(version).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_prefix_rejects_interior_matches() {
        let re = Regex::new("3\\.").unwrap();
        assert!(!matches_prefix(&re, "2.3.1"), "interior match must not count");

        let re = Regex::new("2\\.").unwrap();
        assert!(matches_prefix(&re, "2.3.1"));
    }

    #[test]
    fn test_matches_prefix_with_empty_pattern() {
        let re = Regex::new("").unwrap();
        assert!(matches_prefix(&re, "2.3.1"));
    }

    #[test]
    fn test_matches_prefix_with_alternation() {
        let re = Regex::new("2\\.|9\\.").unwrap();
        assert!(matches_prefix(&re, "9.1"));
        assert!(matches_prefix(&re, "2.0"));
        assert!(!matches_prefix(&re, "1.2.9"));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::BuilderMissing.to_string(),
            "no builder registered"
        );
        assert!(SkipReason::InvalidVersionPattern("boom".to_string())
            .to_string()
            .contains("boom"));
    }
}
