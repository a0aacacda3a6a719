//! Effective settings for a host name
//!
//! OpenSSH takes the first value it sees for each parameter, walking matching
//! `Host` blocks in file order. This is a fold with "set if still unset" slots,
//! never a map merge: a later or more specific block cannot override an
//! earlier one.

use std::path::Path;

use super::block::RawBlock;
use super::error::SshConfigError;
use super::schema::{HostEntry, HostRecord};

/// Per-field slots filled left to right, never overwritten
#[derive(Debug, Default)]
struct FieldSlots {
    hostname: Option<String>,
    user: Option<String>,
    port: Option<String>,
    identity_file: Option<String>,
    proxy_jump: Option<String>,
    proxy_command: Option<String>,
    remote_command: Option<String>,
    request_tty: Option<String>,
    /// Unmodelled directives, first value per keyword (case-insensitive)
    options: Vec<(String, String)>,
}

impl FieldSlots {
    fn absorb(&mut self, block: &RawBlock) {
        for directive in &block.directives {
            if directive.value.is_empty() {
                continue;
            }

            let slot = match directive.keyword.to_ascii_lowercase().as_str() {
                "hostname" => &mut self.hostname,
                "user" => &mut self.user,
                "port" => &mut self.port,
                "identityfile" => &mut self.identity_file,
                "proxyjump" => &mut self.proxy_jump,
                "proxycommand" => &mut self.proxy_command,
                "remotecommand" => &mut self.remote_command,
                "requesttty" => &mut self.request_tty,
                _ => {
                    let seen = self
                        .options
                        .iter()
                        .any(|(k, _)| k.eq_ignore_ascii_case(&directive.keyword));
                    if !seen {
                        self.options
                            .push((directive.keyword.clone(), directive.value.clone()));
                    }
                    continue;
                }
            };

            if slot.is_none() {
                *slot = Some(directive.value.clone());
            }
        }
    }

    fn parse_port(port: Option<String>, name: &str) -> Result<Option<u16>, SshConfigError> {
        port.map(|raw| {
            raw.parse::<u16>()
                .map_err(|_| SshConfigError::InvalidPort {
                    name: name.to_string(),
                    raw_value: raw,
                })
        })
        .transpose()
    }

    fn into_record(
        self,
        home: &RawBlock,
        name: &str,
        source_file: &Path,
    ) -> Result<HostRecord, SshConfigError> {
        let port = Self::parse_port(self.port, name)?;

        let options = if self.options.is_empty() {
            None
        } else {
            Some(
                self.options
                    .iter()
                    .map(|(k, v)| format!("{k} {v}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        Ok(HostRecord {
            name: name.to_string(),
            hostname: self.hostname,
            user: self.user,
            port,
            identity_file: self.identity_file,
            proxy_jump: self.proxy_jump,
            proxy_command: self.proxy_command,
            options,
            remote_command: self.remote_command,
            request_tty: self.request_tty,
            tags: home.tags.clone(),
            source_file: source_file.to_path_buf(),
            source_line: home.line,
        })
    }

    fn into_entry(self, home: &RawBlock, name: &str) -> Result<HostEntry, SshConfigError> {
        let port = Self::parse_port(self.port, name)?;

        Ok(HostEntry {
            name: name.to_string(),
            hostname: self.hostname,
            user: self.user,
            port,
            identity_file: self.identity_file,
            proxy_jump: self.proxy_jump,
            proxy_command: self.proxy_command,
            remote_command: self.remote_command,
            request_tty: self.request_tty,
            tags: home.tags.clone(),
            options: self.options,
        })
    }
}

/// The host's home block: the first block declaring `name` as a literal pattern
pub(crate) fn home_block<'a>(blocks: &'a [RawBlock], name: &str) -> Option<&'a RawBlock> {
    blocks.iter().find(|b| b.declares(name))
}

/// Compute the effective record for `name`.
///
/// Identity, tags, and source location come from the home block; every field
/// comes from the first matching block (in file order) that sets it.
pub(crate) fn resolve(
    blocks: &[RawBlock],
    name: &str,
    source_file: &Path,
) -> Result<HostRecord, SshConfigError> {
    let home = home_block(blocks, name).ok_or_else(|| SshConfigError::NotFound {
        name: name.to_string(),
    })?;

    let mut slots = FieldSlots::default();
    for block in blocks.iter().filter(|b| b.matches(name)) {
        slots.absorb(block);
    }

    slots.into_record(home, name, source_file)
}

/// The values written in the home block itself, ignoring other matching blocks
pub(crate) fn own_entry(blocks: &[RawBlock], name: &str) -> Result<HostEntry, SshConfigError> {
    let home = home_block(blocks, name).ok_or_else(|| SshConfigError::NotFound {
        name: name.to_string(),
    })?;

    let mut slots = FieldSlots::default();
    slots.absorb(home);
    slots.into_entry(home, name)
}
