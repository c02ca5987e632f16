//! Infrastructure layer
//!
//! Filesystem side effects shared by the builders and the pipeline.

pub mod filesystem;
