//! Debian package builder
//!
//! Materializes the payload plus a `DEBIAN/control` file in a scratch tree
//! and drives `fakeroot dpkg-deb --build` to produce the `.deb` artifact.
//! Maintainer scripts from the spec land in `DEBIAN/` with mode 0755,
//! lintian overrides under `usr/share/lintian/overrides/<name>`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::arch::{self, DEB_ARCHES};
use crate::core::config::Configuration;
use crate::core::spec::{PackageEntry, Spec};
use crate::error::{BuilderError, FilesystemError};
use crate::infra::filesystem;

use super::Builder;

/// Builds `.deb` packages via dpkg-deb
pub struct DebianBuilder;

impl DebianBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DebianBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for DebianBuilder {
    fn id(&self) -> &'static str {
        "debian"
    }

    fn filenamegen(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<String, BuilderError> {
        Ok(format!(
            "{}_{}-{}_{}.deb",
            spec.name,
            config.version,
            config.release,
            arch::normalize(&entry.architecture, &DEB_ARCHES)
        ))
    }

    fn tree(
        &self,
        spec: &Spec,
        entry: &PackageEntry,
        config: &Configuration,
    ) -> Result<PathBuf, BuilderError> {
        let dir = super::scratch_dir()?;
        filesystem::create_dir_all(&dir.join("DEBIAN"))?;

        match super::payload_source(spec, config) {
            Some(src) => filesystem::copy_tree(
                &src,
                &dir,
                config.preserve_symlinks,
                config.preserve_permissions,
            )?,
            None => tracing::warn!(
                "No payload tree for '{}', building a meta package",
                spec.name
            ),
        }
        tracing::debug!("Debian package tree created in {}", dir.display());

        let control = render_control(spec, entry, config, filesystem::tree_size_kib(&dir));
        filesystem::write_file(&dir.join("DEBIAN").join("control"), &control)?;

        if let Some(overrides) = &entry.lintian_overrides {
            let lintfile = render_lintian_overrides(&spec.name, overrides);
            filesystem::write_file(
                &dir.join("usr/share/lintian/overrides").join(&spec.name),
                &lintfile,
            )?;
        }

        copy_maintainer_scripts(spec, &dir)?;

        Ok(dir)
    }

    fn build(
        &self,
        build_dir: &Path,
        filename: &str,
        config: &Configuration,
    ) -> Result<(), BuilderError> {
        super::warn_missing_tool("dpkg-deb");

        let artifact = config.output_dir.join(filename);
        tracing::debug!(
            "fakeroot dpkg-deb --build {} {}",
            build_dir.display(),
            artifact.display()
        );

        let output = Command::new("fakeroot")
            .arg("dpkg-deb")
            .arg("--build")
            .arg(build_dir)
            .arg(&artifact)
            .output()
            .map_err(|e| BuilderError::ToolSpawn {
                tool: "fakeroot dpkg-deb".to_string(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            tracing::error!(
                "dpkg-deb output:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(BuilderError::ToolFailed {
                tool: "dpkg-deb".to_string(),
                code: output.status.code().unwrap_or(-1),
                filename: filename.to_string(),
            });
        }

        Ok(())
    }
}

/// Render the DEBIAN/control paragraph
///
/// The release part of the Version field maps `-` to `.` so the release
/// never collides with Debian's version-release separator. Optional fields
/// are omitted entirely when unset.
fn render_control(
    spec: &Spec,
    entry: &PackageEntry,
    config: &Configuration,
    installed_size_kib: u64,
) -> String {
    let release = config.release.replace('-', ".");
    let architecture = arch::normalize(&entry.architecture, &DEB_ARCHES);

    let mut provides = format!("{}-{}", spec.name, config.version);
    if let Some(extra) = &entry.provides {
        provides.push_str(", ");
        provides.push_str(extra);
    }

    let mut control = String::new();
    control.push_str(&format!("Package: {}\n", spec.name));
    control.push_str(&format!("Version: {}-{}\n", config.version, release));
    control.push_str(&format!("Architecture: {architecture}\n"));
    control.push_str(&format!(
        "Maintainer: {}\n",
        spec.maintainer.as_deref().unwrap_or_default()
    ));
    control.push_str(&format!("Installed-Size: {installed_size_kib}\n"));
    if let Some(requires) = &entry.requires {
        let depends = requires.replace("${package_version}", &config.version);
        control.push_str(&format!("Depends: {depends}\n"));
    }
    if let Some(predepends) = &entry.predepends {
        control.push_str(&format!("Pre-Depends: {predepends}\n"));
    }
    if let Some(replaces) = &entry.replaces {
        control.push_str(&format!("Replaces: {replaces}\n"));
    }
    control.push_str(&format!("Provides: {provides}\n"));
    if let Some(conflicts) = &entry.conflicts {
        control.push_str(&format!("Conflicts: {conflicts}\n"));
    }
    control.push_str(&render_description(
        spec.summary.as_deref().unwrap_or_default(),
        spec.description.as_deref().unwrap_or_default(),
    ));

    control
}

/// Fold the long description into control continuation lines
///
/// Every description line is indented one space; blank lines become the
/// ` .` paragraph separator dpkg expects.
fn render_description(summary: &str, description: &str) -> String {
    let mut out = format!("Description: {summary}\n");
    for line in description.trim().lines() {
        if line.trim().is_empty() {
            out.push_str(" .\n");
        } else {
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// One `package: override` line per comma-separated item
fn render_lintian_overrides(name: &str, overrides: &str) -> String {
    overrides
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| format!("{name}: {o}\n"))
        .collect()
}

/// Copy the spec's maintainer scripts into DEBIAN/ with mode 0755
///
/// A missing script file is logged and skipped, matching the tolerant
/// handling of optional scripts.
fn copy_maintainer_scripts(spec: &Spec, dir: &Path) -> Result<(), BuilderError> {
    for (slot, source) in &spec.scripts {
        let source = Path::new(source);
        if !source.is_file() {
            tracing::error!("Installation script '{slot}' not found at {}", source.display());
            continue;
        }

        let target = dir.join("DEBIAN").join(slot);
        std::fs::copy(source, &target).map_err(|e| {
            BuilderError::Filesystem(FilesystemError::Copy {
                from: source.to_path_buf(),
                to: target.clone(),
                error: e.to_string(),
            })
        })?;
        filesystem::make_executable(&target)?;
    }
    Ok(())
}
