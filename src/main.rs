//! repack CLI - package assembly from prebuilt trees
//!
//! Entry point for the repack command-line application.

use anyhow::Result;
use clap::Parser;

use repack::cli::output::display_error;
use repack::cli::Cli;
use repack::config::defaults;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}

/// Map -v/-q and the debug environment toggle to an env filter
///
/// `RUST_LOG` wins when set. Records go to stderr so `--json` output on
/// stdout stays parseable.
fn init_tracing(verbose: u8, quiet: bool) {
    let debug_env = std::env::var(defaults::DEBUG_ENV).is_ok_and(|v| !v.is_empty());
    let verbose = if debug_env { verbose.max(2) } else { verbose };

    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
