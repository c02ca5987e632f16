//! Core business logic module
//!
//! This module contains all business logic for repack. Filesystem
//! primitives live in [`crate::infra`]; package format plugins live in
//! [`crate::builders`].
//!
//! # Submodules
//!
//! - [`spec`] - Package spec (YAML) parsing and validation
//! - [`config`] - Configuration resolution (env, spec, CLI, defaults)
//! - [`arch`] - Architecture alias normalization
//! - [`hooks`] - Lifecycle hook execution
//! - [`pipeline`] - The package build pipeline
//! - [`store`] - Persistent version store
//! - [`check`] - Validate-only mode
//! - [`init`] - Project scaffolding logic

pub mod arch;
pub mod check;
pub mod config;
pub mod hooks;
pub mod init;
pub mod pipeline;
pub mod spec;
pub mod store;
