//! Default configuration values

/// Default directory holding the prebuilt file tree
pub const DIST_DIRECTORY: &str = "DIST/";

/// Default symlink handling when copying the payload tree (follow them)
pub const PRESERVE_SYMLINKS: bool = false;

/// Default permission handling when copying the payload tree (keep them)
pub const PRESERVE_PERMISSIONS: bool = true;

/// Suffix of the per-spec version override environment variable
pub const VERSION_ENV_SUFFIX: &str = "_version";

/// Suffix of the per-spec release override environment variable
pub const RELEASE_ENV_SUFFIX: &str = "_release";

/// Suffix of the build hook argument override environment variable
pub const BUILD_ARGS_ENV_SUFFIX: &str = "_buildargs";

/// Debug-mode toggle: raises log verbosity and keeps scratch trees
pub const DEBUG_ENV: &str = "REPACK_DEBUG";

/// Directory under the user data dir holding repack state
pub const DATA_SUBDIR: &str = "repack";

/// File name of the version store inside the data directory
pub const VERSION_DB_FILE: &str = "versions";

/// Hook environment variable carrying the resolved dist directory
pub const HOOK_ENV_DIST_DIR: &str = "REPACK_DIST_DIR";

/// Hook environment variable carrying the resolved output directory
pub const HOOK_ENV_OUTPUT_DIR: &str = "REPACK_OUTPUT_DIR";
