//! Run configuration resolution
//!
//! Merges the spec's `pkgbuild` block, command-line values, environment
//! overrides, and hard defaults into one `Configuration`. Resolution
//! happens once per run; the result is never mutated afterwards.
//!
//! Precedence per field, highest first: environment variable (version and
//! release only, honored while `env-overrides` is enabled), spec `pkgbuild`
//! value, command-line value, hard default.

use std::path::PathBuf;

use crate::builders::BuilderRegistry;
use crate::config::defaults;
use crate::core::spec::Spec;
use crate::core::store::derived_key;
use crate::error::ConfigError;

/// Which package formats a run builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatFilter {
    /// Every entry whose builder is registered
    All,
    /// Entries of a single format
    Only(String),
}

impl FormatFilter {
    /// True when entries of `format` pass the filter
    pub fn allows(&self, format: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => id == format,
        }
    }
}

/// Command-line inputs to configuration resolution
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Directory receiving the built artifacts
    pub output_dir: PathBuf,

    /// Preserve symlinks when copying the payload tree
    pub preserve_symlinks: bool,

    /// Preserve file permissions when copying the payload tree
    pub preserve_permissions: bool,

    /// Package format filter (`all` or a builder id)
    pub format: String,

    /// Active build profile
    pub profile: Option<String>,

    /// Keep scratch directories after the run
    pub no_clean: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            preserve_symlinks: defaults::PRESERVE_SYMLINKS,
            preserve_permissions: defaults::PRESERVE_PERMISSIONS,
            format: "all".to_string(),
            profile: None,
            no_clean: false,
        }
    }
}

/// Resolved configuration of one run
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Resolved package version
    pub version: String,

    /// Resolved package release
    pub release: String,

    /// Preserve symlinks when copying the payload tree
    pub preserve_symlinks: bool,

    /// Preserve file permissions when copying the payload tree
    pub preserve_permissions: bool,

    /// Directory holding the prebuilt file tree
    pub dist_directory: PathBuf,

    /// Directory receiving the built artifacts
    pub output_dir: PathBuf,

    /// Executable refreshing the dist tree before each entry
    pub update_dist_hook: Option<PathBuf>,

    /// Executable tagging/publishing a release
    pub release_hook: Option<PathBuf>,

    /// Tag passed to the release hook; resolved whenever the hook is set
    pub release_tag: Option<String>,

    /// Executable building the payload before packaging
    pub build_pkg_hook: Option<PathBuf>,

    /// Argument string passed to the build hook; resolved whenever the
    /// hook is set
    pub build_pkg_args: Option<String>,

    /// Package format filter
    pub pkg_format: FormatFilter,

    /// Active build profile
    pub profile: Option<String>,

    /// Keep scratch directories after the run (no-clean or debug mode)
    pub keep_scratch: bool,

    /// Debug mode is active
    pub debug: bool,

    /// Version store location
    pub version_db: PathBuf,

    /// Hook output log for this spec
    pub hook_log: PathBuf,
}

/// Resolve the configuration for one run
///
/// Fails before any package is processed when the format filter names no
/// registered builder or when no version/release can be resolved.
pub fn resolve(
    spec: &Spec,
    registry: &BuilderRegistry,
    opts: &ResolveOptions,
) -> Result<Configuration, ConfigError> {
    let pkg_format = resolve_format(&opts.format, registry)?;

    let env_overrides = spec.pkgbuild.env_overrides;
    let version = resolve_versionish(
        spec.version.as_deref(),
        &derived_key(&spec.name, defaults::VERSION_ENV_SUFFIX),
        env_overrides,
    )
    .ok_or_else(|| ConfigError::MissingVersion {
        name: spec.name.clone(),
        env_var: derived_key(&spec.name, defaults::VERSION_ENV_SUFFIX),
    })?;
    let release = resolve_versionish(
        spec.release.as_deref(),
        &derived_key(&spec.name, defaults::RELEASE_ENV_SUFFIX),
        env_overrides,
    )
    .ok_or_else(|| ConfigError::MissingRelease {
        name: spec.name.clone(),
        env_var: derived_key(&spec.name, defaults::RELEASE_ENV_SUFFIX),
    })?;

    let pkgbuild = &spec.pkgbuild;

    let release_hook = pkgbuild.pkg_release_hooks.as_ref().map(PathBuf::from);
    let release_tag = if release_hook.is_some() {
        Some(match &pkgbuild.pkg_release_tag {
            Some(tag) => tag.clone(),
            None => {
                tracing::warn!("No pkg-release-tag configured, defaulting to version '{version}'");
                version.clone()
            }
        })
    } else {
        None
    };

    let build_pkg_hook = pkgbuild.pkg_build_package.as_ref().map(PathBuf::from);
    let build_pkg_args = if build_pkg_hook.is_some() {
        Some(resolve_build_args(spec, env_overrides))
    } else {
        None
    };

    let debug = std::env::var(defaults::DEBUG_ENV).is_ok_and(|v| !v.is_empty());

    Ok(Configuration {
        version,
        release,
        preserve_symlinks: pkgbuild.preserve_symlinks.unwrap_or(opts.preserve_symlinks),
        preserve_permissions: pkgbuild
            .preserve_permissions
            .unwrap_or(opts.preserve_permissions),
        dist_directory: PathBuf::from(
            pkgbuild
                .dist_directory
                .as_deref()
                .unwrap_or(defaults::DIST_DIRECTORY),
        ),
        output_dir: opts.output_dir.clone(),
        update_dist_hook: pkgbuild.pkg_update_dist.as_ref().map(PathBuf::from),
        release_hook,
        release_tag,
        build_pkg_hook,
        build_pkg_args,
        pkg_format,
        profile: opts.profile.clone(),
        keep_scratch: opts.no_clean || debug,
        debug,
        version_db: pkgbuild
            .version_db
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_version_db),
        hook_log: std::env::temp_dir().join(format!("{}-hooks.log", spec.name)),
    })
}

/// Validate the format filter against the registered builders
fn resolve_format(format: &str, registry: &BuilderRegistry) -> Result<FormatFilter, ConfigError> {
    if format == "all" {
        return Ok(FormatFilter::All);
    }
    if registry.contains(format) {
        return Ok(FormatFilter::Only(format.to_string()));
    }
    Err(ConfigError::UnknownFormat {
        format: format.to_string(),
        known: registry.ids(),
    })
}

/// Environment override then spec value, for version and release
fn resolve_versionish(
    spec_value: Option<&str>,
    env_var: &str,
    env_overrides: bool,
) -> Option<String> {
    if env_overrides {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                tracing::debug!("Using {env_var}={value} from the environment");
                return Some(value);
            }
        }
    }
    spec_value.map(String::from)
}

/// Build hook argument string: spec value, environment, then empty
fn resolve_build_args(spec: &Spec, env_overrides: bool) -> String {
    if let Some(args) = &spec.pkgbuild.pkg_build_args {
        return args.clone();
    }

    let env_var = derived_key(&spec.name, defaults::BUILD_ARGS_ENV_SUFFIX);
    if env_overrides {
        if let Ok(args) = std::env::var(&env_var) {
            if !args.is_empty() {
                return args;
            }
        }
    }

    tracing::warn!("No pkg-build-args configured and {env_var} is unset, using empty arguments");
    String::new()
}

/// Default version store path under the user data directory
fn default_version_db() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(defaults::DATA_SUBDIR))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".local").join("share").join(defaults::DATA_SUBDIR))
                .unwrap_or_else(|| PathBuf::from(".").join(defaults::DATA_SUBDIR))
        })
        .join(defaults::VERSION_DB_FILE)
}
