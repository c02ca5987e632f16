//! repack - build installable packages from a prebuilt file tree
//!
//! This library assembles deb and rpm packages from a declarative YAML
//! spec and a directory of files produced by an external build.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (spec, configuration, hooks, pipeline)
//! - [`builders`] - Package format plugins (debian, rpm)
//! - [`infra`] - Infrastructure layer (filesystem)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod builders;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
