//! Path resolution for the SSH config file
//!
//! - Default: `~/.ssh/config` on every platform (OpenSSH uses the same
//!   location on Windows, under `%USERPROFILE%`)
//! - Override: any path, with a leading `~` expanded

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ssh_config::SshConfigError;

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Get the user's SSH directory
///
/// Returns: `~/.ssh/`
pub fn get_ssh_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".ssh"))
}

/// Get the full path to the user's SSH config file
///
/// Returns: `~/.ssh/config`
pub fn get_ssh_config_path() -> Option<PathBuf> {
    get_ssh_dir().map(|d| d.join("config"))
}

/// Expand a leading `~` or `~/` to the home directory.
///
/// Paths without a leading tilde (and `~user` forms) are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Pick the config file to operate on
pub fn resolve_config_path(override_path: Option<&Path>) -> Result<PathBuf, SshConfigError> {
    if let Some(path) = override_path {
        let resolved = expand_tilde(path);
        tracing::debug!("Using SSH config override: {}", resolved.display());
        return Ok(resolved);
    }

    get_ssh_config_path().ok_or(SshConfigError::NoConfigPath)
}
