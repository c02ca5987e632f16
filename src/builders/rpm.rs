//! RPM package builder
//!
//! Lays the payload out under `BUILD/` next to a rendered `rpm.spec` and
//! drives `fakeroot rpmbuild -bb`. Maintainer scripts are inlined as
//! scriptlets with their shebang stripped; the `%files` section lists every
//! payload path relative to the build root. The target architecture reaches
//! rpmbuild through the spec's `BuildArch` tag, so `build` needs no state
//! beyond the scratch tree.

use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::core::arch::{self, RPM_ARCHES};
use crate::core::config::Configuration;
use crate::core::spec::{PackageEntry, Spec};
use crate::error::BuilderError;
use crate::infra::filesystem;

use super::Builder;

/// Builds `.rpm` packages via rpmbuild
pub struct RpmBuilder;

impl RpmBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RpmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for RpmBuilder {
    fn id(&self) -> &'static str {
        "rpm"
    }

    fn filenamegen(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<String, BuilderError> {
        Ok(format!(
            "{}_{}_{}.rpm",
            spec.name,
            config.version,
            arch::normalize(&entry.architecture, &RPM_ARCHES)
        ))
    }

    fn tree(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<PathBuf, BuilderError> {
        let dir = super::scratch_dir()?;
        let build_root = dir.join("BUILD");
        filesystem::create_dir_all(&build_root)?;

        match super::payload_source(spec, config) {
            Some(src) => filesystem::copy_tree(
                &src,
                &build_root,
                config.preserve_symlinks,
                config.preserve_permissions,
            )?,
            None => tracing::warn!(
                "No payload tree for '{}', building a meta package",
                spec.name
            ),
        }
        tracing::debug!("RPM package tree created in {}", dir.display());

        let file_list = collect_file_list(&build_root);
        let scriptlets = load_scriptlets(spec);
        let rendered = render_rpm_spec(spec, entry, config, &file_list, &scriptlets);
        filesystem::write_file(&dir.join("rpm.spec"), &rendered)?;

        Ok(dir)
    }

    fn build(
        &self,
        build_dir: &Path,
        filename: &str,
        config: &Configuration,
    ) -> Result<(), BuilderError> {
        super::warn_missing_tool("rpmbuild");

        let build_root = absolute(&build_dir.join("BUILD"));
        let spec_file = absolute(&build_dir.join("rpm.spec"));
        let rpm_dir = absolute(&config.output_dir);

        let mut cmd = Command::new("fakeroot");
        cmd.arg("rpmbuild")
            .arg("-bb")
            .arg("--buildroot")
            .arg(&build_root)
            .arg("--define")
            .arg(format!("_rpmdir {}", rpm_dir.display()))
            .arg("--define")
            .arg(format!("_rpmfilename {filename}"));
        if config.debug {
            cmd.arg("--define").arg("noclean 1");
        }
        cmd.arg(&spec_file);

        tracing::debug!("fakeroot rpmbuild -bb {}", spec_file.display());

        let output = cmd.output().map_err(|e| BuilderError::ToolSpawn {
            tool: "fakeroot rpmbuild".to_string(),
            error: e.to_string(),
        })?;

        if !output.status.success() {
            tracing::error!(
                "rpmbuild output:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(BuilderError::ToolFailed {
                tool: "rpmbuild".to_string(),
                code: output.status.code().unwrap_or(-1),
                filename: filename.to_string(),
            });
        }

        Ok(())
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Maintainer scripts inlined into the rpm spec
#[derive(Debug, Default, PartialEq)]
struct Scriptlets {
    pre: Option<String>,
    post: Option<String>,
    preun: Option<String>,
    postun: Option<String>,
}

/// Read the spec's maintainer scripts into their rpm scriptlet slots
///
/// Script files are inlined with the shebang line removed; a missing file
/// is logged and its slot stays empty.
fn load_scriptlets(spec: &Spec) -> Scriptlets {
    let mut scriptlets = Scriptlets::default();

    for (slot, source) in &spec.scripts {
        let target = match slot.as_str() {
            "preinst" => &mut scriptlets.pre,
            "postinst" => &mut scriptlets.post,
            "prerm" => &mut scriptlets.preun,
            "postrm" => &mut scriptlets.postun,
            other => {
                tracing::debug!("Script slot '{other}' has no rpm scriptlet equivalent");
                continue;
            }
        };

        match std::fs::read_to_string(source) {
            Ok(content) => *target = Some(strip_shebang(&content)),
            Err(_) => {
                tracing::error!("Installation script '{slot}' not found at {source}");
            }
        }
    }

    scriptlets
}

fn strip_shebang(content: &str) -> String {
    if content.starts_with("#!") {
        content
            .split_once('\n')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default()
    } else {
        content.to_string()
    }
}

/// `%files` entries relative to the build root, directories tagged `%dir`
fn collect_file_list(build_root: &Path) -> Vec<String> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(build_root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        let rel = match entry.path().strip_prefix(build_root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            entries.push(format!("%dir \"/{}\"", rel.display()));
        } else {
            entries.push(format!("\"/{}\"", rel.display()));
        }
    }
    entries
}

/// Render the rpm.spec document
fn render_rpm_spec(
    spec: &Spec,
    entry: &PackageEntry,
    config: &Configuration,
    file_list: &[String],
    scriptlets: &Scriptlets,
) -> String {
    let architecture = arch::normalize(&entry.architecture, &RPM_ARCHES);

    let mut out = String::new();
    out.push_str(&format!("Name: {}\n", spec.name));
    out.push_str(&format!("Version: {}\n", config.version));
    out.push_str(&format!("Release: {}\n", config.release));
    out.push_str(&format!(
        "Summary: {}\n",
        spec.summary.as_deref().unwrap_or_default()
    ));
    out.push_str("License: N/A\n");
    out.push_str("Group: Applications/System\n");
    out.push_str(&format!(
        "Packager: {}\n",
        spec.maintainer.as_deref().unwrap_or_default()
    ));
    out.push_str(&format!("BuildArch: {architecture}\n"));
    out.push_str("AutoReqProv: no\n");
    if let Some(requires) = &entry.requires {
        out.push_str(&format!("Requires: {requires}\n"));
    }
    if let Some(replaces) = &entry.replaces {
        out.push_str(&format!("Obsoletes: {replaces}\n"));
    }
    if let Some(conflicts) = &entry.conflicts {
        out.push_str(&format!("Conflicts: {conflicts}\n"));
    }
    if let Some(provides) = &entry.provides {
        out.push_str(&format!("Provides: {provides}\n"));
    }

    out.push_str("\n%description\n");
    out.push_str(spec.description.as_deref().unwrap_or_default());
    out.push('\n');

    for (section, body) in [
        ("%pre", &scriptlets.pre),
        ("%post", &scriptlets.post),
        ("%preun", &scriptlets.preun),
        ("%postun", &scriptlets.postun),
    ] {
        if let Some(body) = body {
            out.push_str(&format!("\n{section}\n{body}\n"));
        }
    }

    out.push_str("\n%files\n");
    for entry in file_list {
        out.push_str(entry);
        out.push('\n');
    }

    out
}
