//! Host data structures
//!
//! [`HostRecord`] is the effective, merged, read-only view of one host.
//! [`HostEntry`] is the editable value set handed to the write path.

use std::path::PathBuf;

use serde::Serialize;

use super::error::SshConfigError;

/// Directives with a field in the structured model, in the order new
/// blocks are written
pub(crate) const MODELED_KEYWORDS: [&str; 8] = [
    "HostName",
    "User",
    "Port",
    "IdentityFile",
    "ProxyJump",
    "ProxyCommand",
    "RemoteCommand",
    "RequestTTY",
];

/// Effective settings for one concrete host name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    /// Canonical name: the literal `Host` pattern that owns this record
    pub name: String,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
    pub proxy_jump: Option<String>,
    pub proxy_command: Option<String>,
    /// Non-modelled directives, one `Keyword value` per line
    pub options: Option<String>,
    pub remote_command: Option<String>,
    pub request_tty: Option<String>,
    pub tags: Vec<String>,
    /// File the owning `Host` line was read from
    pub source_file: PathBuf,
    /// 1-based line number of the owning `Host` line
    pub source_line: usize,
}

impl HostRecord {
    /// Check whether the host carries a tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Values for creating or updating a host block.
///
/// `None` means "no such directive in this block". `options` are extra
/// `(keyword, value)` directives written only when a new block is created;
/// updates leave a block's unmodelled lines untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEntry {
    pub name: String,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
    pub proxy_jump: Option<String>,
    pub proxy_command: Option<String>,
    pub remote_command: Option<String>,
    pub request_tty: Option<String>,
    pub tags: Vec<String>,
    pub options: Vec<(String, String)>,
}

impl HostEntry {
    /// Create an entry with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: set hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Builder pattern: set user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Builder pattern: set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder pattern: set identity file
    pub fn with_identity_file(mut self, path: impl Into<String>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Builder pattern: set jump host
    pub fn with_proxy_jump(mut self, jump: impl Into<String>) -> Self {
        self.proxy_jump = Some(jump.into());
        self
    }

    /// Builder pattern: add tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder pattern: add an unmodelled directive
    pub fn with_option(mut self, keyword: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((keyword.into(), value.into()));
        self
    }

    /// Modelled directive values, paired with their canonical keyword
    pub(crate) fn modeled_values(&self) -> [(&'static str, Option<String>); 8] {
        let [hostname, user, port, identity, jump, command, remote, tty] = MODELED_KEYWORDS;
        [
            (hostname, self.hostname.clone()),
            (user, self.user.clone()),
            (port, self.port.map(|p| p.to_string())),
            (identity, self.identity_file.clone()),
            (jump, self.proxy_jump.clone()),
            (command, self.proxy_command.clone()),
            (remote, self.remote_command.clone()),
            (tty, self.request_tty.clone()),
        ]
    }

    /// Check that every part of the entry can be written as config lines
    pub fn validate(&self) -> Result<(), SshConfigError> {
        validate_host_name(&self.name)?;

        for (keyword, value) in self.modeled_values() {
            if let Some(value) = value {
                validate_value(keyword, &value)?;
            }
        }

        for tag in &self.tags {
            if tag.trim().is_empty() || tag.contains([',', '\n', '\r']) {
                return Err(SshConfigError::InvalidValue {
                    keyword: "Tags".to_string(),
                    reason: format!("'{tag}' must be non-empty and contain no commas or newlines"),
                });
            }
        }

        for (keyword, value) in &self.options {
            if keyword.is_empty()
                || keyword.contains(|c: char| c.is_whitespace() || c == '=' || c == '#')
                || keyword.eq_ignore_ascii_case("host")
                || keyword.eq_ignore_ascii_case("match")
            {
                return Err(SshConfigError::InvalidValue {
                    keyword: keyword.clone(),
                    reason: "not a usable directive keyword".to_string(),
                });
            }
            validate_value(keyword, value)?;
        }

        Ok(())
    }
}

/// Take every effective value of a record, inherited ones included.
///
/// Use [`HostRegistry::entry`](super::HostRegistry::entry) instead to edit
/// only what the host's own block says.
impl From<&HostRecord> for HostEntry {
    fn from(record: &HostRecord) -> Self {
        let options = record
            .options
            .as_deref()
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.split_once(' '))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            name: record.name.clone(),
            hostname: record.hostname.clone(),
            user: record.user.clone(),
            port: record.port,
            identity_file: record.identity_file.clone(),
            proxy_jump: record.proxy_jump.clone(),
            proxy_command: record.proxy_command.clone(),
            remote_command: record.remote_command.clone(),
            request_tty: record.request_tty.clone(),
            tags: record.tags.clone(),
            options,
        }
    }
}

/// A host name must be usable as a single literal `Host` pattern
pub fn validate_host_name(name: &str) -> Result<(), SshConfigError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if name.contains(['*', '?']) {
        Some("must not contain wildcards")
    } else if name.starts_with('!') || name.starts_with('#') {
        Some("must not start with '!' or '#'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SshConfigError::InvalidHostName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_value(keyword: &str, value: &str) -> Result<(), SshConfigError> {
    if value.trim().is_empty() || value.contains(['\n', '\r']) {
        return Err(SshConfigError::InvalidValue {
            keyword: keyword.to_string(),
            reason: "must be a non-empty single line".to_string(),
        });
    }
    Ok(())
}
