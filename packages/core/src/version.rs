//! Version and build metadata for `sshm --version`

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set by release builds
const GIT_HASH: Option<&str> = option_env!("SSHM_GIT_HASH");
const BUILD_DATE: Option<&str> = option_env!("SSHM_BUILD_DATE");

pub fn get_version() -> &'static str {
    VERSION
}

/// Version with whatever build metadata was compiled in, e.g.
/// `1.2.0 (git abc123, built 2026-01-05)`. Plain version otherwise.
pub fn get_version_long() -> String {
    let build: Vec<String> = [("git", GIT_HASH), ("built", BUILD_DATE)]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label} {v}")))
        .collect();

    if build.is_empty() {
        VERSION.to_string()
    } else {
        format!("{VERSION} ({})", build.join(", "))
    }
}
