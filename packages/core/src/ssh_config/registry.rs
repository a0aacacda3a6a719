//! Host registry
//!
//! A snapshot of one config file: its `Host` blocks and the ordered set of
//! literal host names they declare. Records are merged on demand and never
//! cached; reloading builds a new registry.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::block::{RawBlock, assemble};
use super::error::SshConfigError;
use super::line::{LineKind, classify};
use super::merge::{home_block, own_entry, resolve};
use super::pattern::is_literal;
use super::schema::{HostEntry, HostRecord};

/// Host names and blocks of one SSH config file
#[derive(Debug, Clone)]
pub struct HostRegistry {
    path: PathBuf,
    blocks: Vec<RawBlock>,
    /// Literal names in order of first declaration
    names: Vec<String>,
    declared: HashSet<String>,
}

impl HostRegistry {
    /// Load and index the config file at `path`.
    ///
    /// A missing file loads as an empty registry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SshConfigError> {
        let path = path.as_ref();

        let registry = match read_config(path)? {
            Some(text) => Self::parse(path, &text),
            None => {
                tracing::debug!("SSH config not found, using empty registry: {}", path.display());
                Self::parse(path, "")
            }
        };

        tracing::debug!(
            "Loaded {} hosts from {} ({} blocks)",
            registry.names.len(),
            path.display(),
            registry.blocks.len()
        );
        Ok(registry)
    }

    /// Build a registry from config text that was read from `path`
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let blocks = assemble(text);

        let mut names = Vec::new();
        let mut declared = HashSet::new();
        for block in &blocks {
            for name in block.literal_names() {
                if declared.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
        }

        Self {
            path: path.into(),
            blocks,
            names,
            declared,
        }
    }

    /// Path this registry was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Host names in order of first literal declaration
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a block declares `name` literally
    pub fn contains(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Effective merged record for `name`
    pub fn get(&self, name: &str) -> Result<HostRecord, SshConfigError> {
        resolve(&self.blocks, name, &self.path)
    }

    /// Merge result for every host, in declaration order
    pub fn records(&self) -> Vec<Result<HostRecord, SshConfigError>> {
        self.names.iter().map(|name| self.get(name)).collect()
    }

    /// Effective records for every host, in declaration order.
    ///
    /// A host whose merge fails (bad `Port`) is logged and left out; the
    /// rest of the file still lists.
    pub fn list(&self) -> Vec<HostRecord> {
        self.records()
            .into_iter()
            .filter_map(|result| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping host in listing: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Tags from the `# Tags:` comment of the host's home block
    pub fn tags(&self, name: &str) -> Option<&[String]> {
        self.home_block(name).map(|block| block.tags.as_slice())
    }

    /// Values written in the host's own block, for editing
    pub fn entry(&self, name: &str) -> Result<HostEntry, SshConfigError> {
        own_entry(&self.blocks, name)
    }

    /// Host names starting with `prefix`, compared case-insensitively
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub(crate) fn home_block(&self, name: &str) -> Option<&RawBlock> {
        home_block(&self.blocks, name)
    }
}

/// Check whether `name` is declared literally in the config at `path`,
/// without assembling blocks or merging fields.
///
/// A missing file declares nothing.
pub fn quick_host_exists(path: impl AsRef<Path>, name: &str) -> Result<bool, SshConfigError> {
    let path = path.as_ref();
    let Some(text) = read_config(path)? else {
        return Ok(false);
    };

    let found = text.lines().any(|line| match classify(line) {
        LineKind::HostDecl(patterns) => patterns.iter().any(|p| is_literal(p) && *p == name),
        _ => false,
    });

    tracing::debug!("Quick lookup of '{}' in {}: {}", name, path.display(), found);
    Ok(found)
}

/// Read the config file as UTF-8 text. `Ok(None)` if it does not exist.
pub(crate) fn read_config(path: &Path) -> Result<Option<String>, SshConfigError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SshConfigError::Parse {
                path: path.to_path_buf(),
                line: None,
                reason: e.to_string(),
            });
        }
    };

    String::from_utf8(bytes).map(Some).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        SshConfigError::Parse {
            path: path.to_path_buf(),
            line: Some(line),
            reason: "file is not valid UTF-8".to_string(),
        }
    })
}
