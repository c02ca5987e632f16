//! Constants and default configuration values

pub mod defaults;
