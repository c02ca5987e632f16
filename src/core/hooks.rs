//! Lifecycle hook execution
//!
//! Three independent hook slots run before each eligible package entry, in
//! fixed order: update, release, build. A configured hook that fails stops
//! the entire run; an unconfigured slot is a silent no-op. Hook output is
//! appended to the per-spec log artifact for post-mortem inspection and is
//! not part of the success signal.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults;
use crate::core::config::Configuration;
use crate::error::HookError;

/// One of the three lifecycle hook slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Refreshes the dist tree
    Update,
    /// Tags/publishes a release
    Release,
    /// Builds the payload before packaging
    Build,
}

impl Hook {
    /// Slot name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Release => "release",
            Self::Build => "build",
        }
    }
}

/// Runs the configured lifecycle hooks of one run configuration
pub struct HookRunner<'a> {
    config: &'a Configuration,
}

impl<'a> HookRunner<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Run update, release, and build in order; the first failure aborts
    pub fn run_all(&self) -> Result<(), HookError> {
        self.run(Hook::Update)?;
        self.run(Hook::Release)?;
        self.run(Hook::Build)?;
        Ok(())
    }

    /// Run one hook slot; unconfigured slots succeed silently
    pub fn run(&self, hook: Hook) -> Result<(), HookError> {
        let Some(path) = self.hook_path(hook) else {
            tracing::debug!("No {} hook configured", hook.name());
            return Ok(());
        };

        tracing::info!("Running {} hook: {}", hook.name(), path.display());

        let mut cmd = Command::new(path);
        cmd.args(self.hook_args(hook));
        cmd.env(defaults::HOOK_ENV_DIST_DIR, &self.config.dist_directory);
        cmd.env(defaults::HOOK_ENV_OUTPUT_DIR, &self.config.output_dir);

        let output = cmd.output().map_err(|e| HookError::Spawn {
            hook: hook.name().to_string(),
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        self.append_log(hook, &output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(HookError::Failed {
                hook: hook.name().to_string(),
                path: path.to_path_buf(),
                code: output.status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }

    fn hook_path(&self, hook: Hook) -> Option<&PathBuf> {
        match hook {
            Hook::Update => self.config.update_dist_hook.as_ref(),
            Hook::Release => self.config.release_hook.as_ref(),
            Hook::Build => self.config.build_pkg_hook.as_ref(),
        }
    }

    fn hook_args(&self, hook: Hook) -> Vec<String> {
        match hook {
            Hook::Update => Vec::new(),
            Hook::Release => {
                let mut args = vec![format!(
                    "{}.{}",
                    self.config.version, self.config.release
                )];
                if let Some(tag) = &self.config.release_tag {
                    args.push(tag.clone());
                }
                args
            }
            Hook::Build => {
                vec![self.config.build_pkg_args.clone().unwrap_or_default()]
            }
        }
    }

    /// Append captured output to the hook log; log trouble is non-fatal
    fn append_log(&self, hook: Hook, stdout: &[u8], stderr: &[u8]) {
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.hook_log)
            .and_then(|mut log| {
                writeln!(log, "=== {} hook ===", hook.name())?;
                log.write_all(stdout)?;
                log.write_all(stderr)
            });

        if let Err(e) = result {
            tracing::warn!(
                "Could not append to hook log {}: {e}",
                self.config.hook_log.display()
            );
        }
    }
}

/// True when a hook path looks runnable, used for early diagnostics
pub fn hook_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FormatFilter;
    use std::path::PathBuf;

    fn test_config(dir: &Path) -> Configuration {
        Configuration {
            version: "1.0".to_string(),
            release: "2".to_string(),
            preserve_symlinks: false,
            preserve_permissions: true,
            dist_directory: dir.join("DIST"),
            output_dir: dir.to_path_buf(),
            update_dist_hook: None,
            release_hook: None,
            release_tag: None,
            build_pkg_hook: None,
            build_pkg_args: None,
            pkg_format: FormatFilter::All,
            profile: None,
            keep_scratch: false,
            debug: false,
            version_db: dir.join("versions"),
            hook_log: dir.join("hooks.log"),
        }
    }

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_unconfigured_hooks_are_silent_noops() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        HookRunner::new(&config).run_all().unwrap();
        assert!(!config.hook_log.exists());
    }

    #[test]
    fn test_release_hook_receives_version_release_and_tag() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "release.sh",
            "#!/bin/sh\necho \"args: $1 $2\"\n",
        );

        let mut config = test_config(dir.path());
        config.release_hook = Some(script);
        config.release_tag = Some("stable".to_string());

        HookRunner::new(&config).run_all().unwrap();

        let log = std::fs::read_to_string(&config.hook_log).unwrap();
        assert!(log.contains("args: 1.0.2 stable"), "log was: {log}");
    }

    #[test]
    fn test_build_hook_receives_single_argument_string() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "build.sh", "#!/bin/sh\necho \"got:$1:$#\"\n");

        let mut config = test_config(dir.path());
        config.build_pkg_hook = Some(script);
        config.build_pkg_args = Some("--target x86".to_string());

        HookRunner::new(&config).run_all().unwrap();

        let log = std::fs::read_to_string(&config.hook_log).unwrap();
        assert!(log.contains("got:--target x86:1"), "log was: {log}");
    }

    #[test]
    fn test_hooks_see_dist_and_output_environment() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "update.sh",
            "#!/bin/sh\necho \"dist=$REPACK_DIST_DIR out=$REPACK_OUTPUT_DIR\"\n",
        );

        let mut config = test_config(dir.path());
        config.update_dist_hook = Some(script);

        HookRunner::new(&config).run_all().unwrap();

        let log = std::fs::read_to_string(&config.hook_log).unwrap();
        assert!(log.contains("dist="), "log was: {log}");
        assert!(log.contains(&format!("out={}", dir.path().display())));
    }

    #[test]
    fn test_failing_update_hook_stops_later_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("release-ran");
        let release = write_script(
            dir.path(),
            "release.sh",
            &format!("#!/bin/sh\ntouch {}\n", marker.display()),
        );

        let mut config = test_config(dir.path());
        config.update_dist_hook = Some(PathBuf::from("/bin/false"));
        config.release_hook = Some(release);
        config.release_tag = Some("stable".to_string());

        let err = HookRunner::new(&config).run_all().unwrap_err();
        match err {
            HookError::Failed { hook, code, .. } => {
                assert_eq!(hook, "update");
                assert_eq!(code, 1);
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
        assert!(!marker.exists(), "release hook must not run after a failed update hook");
    }

    #[test]
    fn test_missing_hook_executable_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.update_dist_hook = Some(dir.path().join("no-such-hook.sh"));

        let err = HookRunner::new(&config).run_all().unwrap_err();
        assert!(matches!(err, HookError::Spawn { .. }));
    }

    #[test]
    fn test_hook_log_accumulates_across_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let update = write_script(dir.path(), "update.sh", "#!/bin/sh\necho first\n");
        let build = write_script(dir.path(), "build.sh", "#!/bin/sh\necho second >&2\n");

        let mut config = test_config(dir.path());
        config.update_dist_hook = Some(update);
        config.build_pkg_hook = Some(build);
        config.build_pkg_args = Some(String::new());

        HookRunner::new(&config).run_all().unwrap();

        let log = std::fs::read_to_string(&config.hook_log).unwrap();
        assert!(log.contains("=== update hook ==="));
        assert!(log.contains("first"));
        assert!(log.contains("=== build hook ==="));
        assert!(log.contains("second"), "stderr should be captured: {log}");
    }
}
