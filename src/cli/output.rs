//! Output formatting
//!
//! User-facing status lines. Diagnostic records go through `tracing`;
//! these are the result lines a default run still prints.

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}

/// Print a success line
pub fn print_success(message: &str) {
    println!("{} {message}", status::SUCCESS);
}

/// Print a warning line
pub fn print_warning(message: &str) {
    println!("{} {message}", status::WARNING);
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    println!("  {message}");
}

/// Print a top-level error with its context chain
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", status::ERROR);
}
