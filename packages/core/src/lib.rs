//! sshm-core - SSH config model for sshm
//!
//! Parses an OpenSSH client config into a host registry, resolves effective
//! per-host settings, and writes host edits back into the file in place.

pub mod config;
pub mod ssh_config;
pub mod version;

pub use config::{get_ssh_config_path, resolve_config_path};
pub use ssh_config::{
    HostEntry, HostRecord, HostRegistry, SshConfigError, quick_host_exists, validate_host_name,
};
pub use version::{get_version, get_version_long};
