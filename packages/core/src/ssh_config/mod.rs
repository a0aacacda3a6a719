//! SSH config model
//!
//! Reads an OpenSSH client config into an ordered registry of host names,
//! computes each host's effective settings the way `ssh` does (first value
//! wins across matching `Host` blocks), and edits host blocks in place
//! without disturbing the rest of the file.

mod block;
mod edit;
pub mod error;
pub mod line;
mod merge;
pub mod pattern;
pub mod registry;
pub mod schema;

pub use error::SshConfigError;
pub use line::{LineKind, classify};
pub use pattern::{glob_match, is_literal, matches_any};
pub use registry::{HostRegistry, quick_host_exists};
pub use schema::{HostEntry, HostRecord, validate_host_name};
