//! Target architecture aliasing
//!
//! Spec files may name an architecture loosely ("system", "64bit",
//! "64-bit"); each packaging tool wants its own concrete token. The alias
//! table is tiny on purpose: anything not listed passes through untouched so
//! uncommon architectures ("armhf", "noarch") reach the builder verbatim.

/// Architecture vocabulary of one package format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchTable {
    /// Token for 32-bit x86
    pub bits32: &'static str,
    /// Token for 64-bit x86
    pub bits64: &'static str,
}

/// Debian architecture tokens
pub const DEB_ARCHES: ArchTable = ArchTable {
    bits32: "i386",
    bits64: "amd64",
};

/// RPM architecture tokens
pub const RPM_ARCHES: ArchTable = ArchTable {
    bits32: "i386",
    bits64: "x86_64",
};

/// Pointer-width name of the host, as spec files spell it
pub fn host_arch() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "64bit"
    } else {
        "32bit"
    }
}

/// Resolve a spec architecture string to a format-specific token
///
/// `system` resolves to the host architecture first; the 32/64-bit
/// spellings then map through the format vocabulary.
pub fn normalize(architecture: &str, table: &ArchTable) -> String {
    let arch = if architecture == "system" {
        host_arch()
    } else {
        architecture
    };

    match arch {
        "32-bit" | "32bit" => table.bits32.to_string(),
        "64-bit" | "64bit" => table.bits64.to_string(),
        other => other.to_string(),
    }
}
