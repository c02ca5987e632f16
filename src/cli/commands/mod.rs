//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod init;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the packages a spec requests
    Build {
        /// Path to the package spec (YAML)
        spec: PathBuf,

        /// Directory receiving the built artifacts
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Keep scratch directories after the run
        #[arg(short = 'C', long)]
        no_clean: bool,

        /// Package format to build (`all` or a builder id)
        #[arg(short, long, default_value = "all")]
        format: String,

        /// Active build profile
        #[arg(long)]
        profile: Option<String>,

        /// Preserve symlinks when copying the payload tree
        #[arg(short = 'p', long)]
        preserve_symlinks: bool,

        /// Copy the payload tree without preserving file permissions
        #[arg(short = 'P', long)]
        no_preserve_permissions: bool,

        /// Print a machine-readable build summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a spec without building
    Check {
        /// Path to the package spec (YAML)
        spec: PathBuf,

        /// Package format to validate (`all` or a builder id)
        #[arg(short, long, default_value = "all")]
        format: String,

        /// Active build profile
        #[arg(long)]
        profile: Option<String>,
    },

    /// Scaffold a starter spec and distribution directory
    Init {
        /// Package name (defaults to the directory name)
        name: Option<String>,

        /// Overwrite an existing spec file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Build {
                spec,
                output,
                no_clean,
                format,
                profile,
                preserve_symlinks,
                no_preserve_permissions,
                json,
            } => {
                let options = build::BuildOptions {
                    output_dir: output,
                    no_clean,
                    format,
                    profile,
                    preserve_symlinks,
                    no_preserve_permissions,
                    json,
                };
                build::execute(&spec, options).await
            }
            Self::Check {
                spec,
                format,
                profile,
            } => check::execute(&spec, format, profile).await,
            Self::Init { name, force } => {
                let current_dir = std::env::current_dir()?;
                init::execute(&current_dir, name, force).await
            }
        }
    }
}
