//! Error types for repack
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Specification loading and validation errors
#[derive(Error, Debug)]
pub enum SpecError {
    /// Spec file not found
    #[error("Package spec not found: {path}")]
    NotFound { path: PathBuf },

    /// IO error while reading the spec
    #[error("Failed to read package spec '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// YAML parse error
    #[error("Failed to parse package spec '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Required field missing or empty
    #[error("Package spec is missing required field '{field}'")]
    MissingField { field: String },
}

/// Configuration resolution errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Package format filter names no registered builder
    #[error("Unknown package format '{format}': must be 'all' or one of {known:?}")]
    UnknownFormat { format: String, known: Vec<String> },

    /// No version could be resolved for the spec
    #[error("No version for '{name}': set 'version' in the spec or export {env_var}")]
    MissingVersion { name: String, env_var: String },

    /// No release could be resolved for the spec
    #[error("No release for '{name}': set 'release' in the spec or export {env_var}")]
    MissingRelease { name: String, env_var: String },
}

/// Lifecycle hook execution errors
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook executable could not be started
    #[error("Failed to spawn {hook} hook '{path}': {error}")]
    Spawn {
        hook: String,
        path: PathBuf,
        error: String,
    },

    /// The hook exited with a non-zero status
    #[error("{hook} hook '{path}' failed with exit code {code}")]
    Failed {
        hook: String,
        path: PathBuf,
        code: i32,
    },
}

/// Package builder errors
#[derive(Error, Debug)]
pub enum BuilderError {
    /// No builder registered for the requested format
    #[error("No builder registered for package format '{format}'")]
    Unregistered { format: String },

    /// Failed to render format metadata (control file, spec file)
    #[error("Failed to write {what} in '{path}': {error}")]
    Render {
        what: String,
        path: PathBuf,
        error: String,
    },

    /// The external packaging tool could not be started
    #[error("Failed to run '{tool}': {error}")]
    ToolSpawn { tool: String, error: String },

    /// The external packaging tool exited with a non-zero status
    #[error("'{tool}' failed with exit code {code} while building {filename}")]
    ToolFailed {
        tool: String,
        code: i32,
        filename: String,
    },

    /// Filesystem error in the scratch tree
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Version store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing file could not be opened or created
    #[error("Failed to open version store '{path}': {error}")]
    Open { path: PathBuf, error: String },

    /// Backing file could not be written
    #[error("Failed to persist version store '{path}': {error}")]
    Persist { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy a payload entry
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to create a scratch directory
    #[error("Failed to create scratch directory: {error}")]
    Scratch { error: String },
}

/// Project initialization errors
#[derive(Error, Debug)]
pub enum InitError {
    /// Directory not found
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// A spec file already exists
    #[error("'{path}' already exists. Use --force to overwrite")]
    SpecExists { path: PathBuf },

    /// IO error during initialization
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Top-level repack error type
#[derive(Error, Debug)]
pub enum RepackError {
    /// Spec error
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Hook error
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Builder error
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// Version store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Init error
    #[error(transparent)]
    Init(#[from] InitError),

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
