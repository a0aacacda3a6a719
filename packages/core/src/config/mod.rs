//! SSH config file location
//!
//! Resolves which config file a command works on: an explicit override
//! (`-c`/`--config`) or the user's `~/.ssh/config`.

pub mod paths;

pub use paths::{expand_tilde, get_ssh_config_path, get_ssh_dir, resolve_config_path};
