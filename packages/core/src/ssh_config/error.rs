//! SSH config error types
//!
//! Errors that can occur while loading, querying, or editing an SSH config file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during SSH config operations
#[derive(Error, Debug)]
pub enum SshConfigError {
    /// Config file could not be opened or decoded
    #[error("Failed to read {}{}: {reason}", .path.display(), .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },

    /// No `Host` line declares this name literally
    #[error("Host '{name}' not found in SSH configuration")]
    NotFound { name: String },

    /// The effective `Port` directive is not a valid port number
    #[error("Invalid port '{raw_value}' for host '{name}'")]
    InvalidPort { name: String, raw_value: String },

    /// The file changed since it was loaded; the block is no longer where it was
    #[error(
        "{} changed since it was loaded: line {line} no longer declares host '{name}'. Reload and try again.",
        .path.display()
    )]
    StaleEdit {
        path: PathBuf,
        line: usize,
        name: String,
    },

    /// Failed to write the config file
    #[error("Failed to write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    /// Host is already declared (add of an existing name)
    #[error("Host '{name}' already exists in SSH configuration")]
    AlreadyExists { name: String },

    /// Host name cannot be written as a literal `Host` pattern
    #[error("Invalid host name '{name}': {reason}")]
    InvalidHostName { name: String, reason: String },

    /// Value cannot be written on a single config line
    #[error("Invalid value for {keyword}: {reason}")]
    InvalidValue { keyword: String, reason: String },

    /// No override given and no home directory to find ~/.ssh/config
    #[error("Could not determine SSH config path (no home directory)")]
    NoConfigPath,
}

impl SshConfigError {
    /// Whether this error means "the requested host does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
