//! Build-time information
//!
//! Metadata captured by `build.rs` at compile time.

/// Build timestamp (when the binary was compiled)
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Rust compiler version (e.g., 1.85.0)
pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// Rust channel (stable, beta, or nightly)
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

/// Returns `{crate version} ({target_triple}-opt{opt_level})`
pub fn version_string() -> String {
    format!(
        "{} ({}-opt{})",
        env!("CARGO_PKG_VERSION"),
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL
    )
}

/// One `key: value` line per build fact
pub fn detail_lines() -> Vec<String> {
    vec![
        format!("Built: {}", BUILD_TIMESTAMP),
        format!("Target: {}", CARGO_TARGET_TRIPLE),
        format!("Optimization: {}", CARGO_OPT_LEVEL),
        format!("Rustc: {} ({})", RUSTC_SEMVER, RUSTC_CHANNEL),
    ]
}

/// `version_string()` followed by `detail_lines()`, one per line
pub fn long_version() -> String {
    std::iter::once(version_string())
        .chain(detail_lines())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_starts_with_short_version() {
        let long = long_version();
        let lines: Vec<&str> = long.lines().collect();

        assert_eq!(lines[0], version_string());
        assert_eq!(lines.len(), 1 + detail_lines().len());
        assert!(lines[1].starts_with("Built: "));
        assert!(lines[4].starts_with("Rustc: "));
    }
}
