//! SSH config editing
//!
//! Every mutation re-reads the file, checks that the target `Host` line is
//! still where the registry saw it, and rewrites only that block's lines.
//! Everything outside the block (other hosts, comments, unmodelled
//! directives, line endings) is written back byte for byte.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::block::{RawBlock, assemble};
use super::error::SshConfigError;
use super::line::split_keyword;
use super::registry::{HostRegistry, read_config};
use super::schema::{HostEntry, MODELED_KEYWORDS};

const DEFAULT_INDENT: &str = "    ";

impl HostRegistry {
    /// Add a new host block. Fails if the name is already declared.
    pub fn add(&self, entry: &HostEntry) -> Result<(), SshConfigError> {
        if self.contains(&entry.name) {
            return Err(SshConfigError::AlreadyExists {
                name: entry.name.clone(),
            });
        }
        self.upsert(entry)
    }

    /// Update the host's block in place, or append a new block if the
    /// registry does not know the host.
    pub fn upsert(&self, entry: &HostEntry) -> Result<(), SshConfigError> {
        entry.validate()?;

        let fresh = read_config(self.path())?;

        let new_text = match self.home_block(&entry.name) {
            Some(loaded) => {
                let text = fresh.ok_or_else(|| self.stale(loaded, &entry.name))?;
                let block = self.locate(&text, loaded, &entry.name)?;

                let mut config = ConfigText::new(&text);
                update_block(&mut config, &block, entry);

                tracing::debug!(
                    "Updating host '{}' at lines {}-{} of {}",
                    entry.name,
                    block.start_line(),
                    block.end_line(),
                    self.path().display()
                );
                config.into_string()
            }
            None => {
                let text = fresh.unwrap_or_default();
                if assemble(&text).iter().any(|b| b.declares(&entry.name)) {
                    return Err(SshConfigError::AlreadyExists {
                        name: entry.name.clone(),
                    });
                }
                append_block(&text, entry)
            }
        };

        write_config(self.path(), &new_text)?;

        tracing::info!(
            "Saved host '{}' to SSH config at {}",
            entry.name,
            self.path().display()
        );
        Ok(())
    }

    /// Remove a host. A block shared with other aliases keeps them and only
    /// loses this name from its `Host` line.
    pub fn remove(&self, name: &str) -> Result<(), SshConfigError> {
        let loaded = self
            .home_block(name)
            .ok_or_else(|| SshConfigError::NotFound {
                name: name.to_string(),
            })?;

        let text = read_config(self.path())?.ok_or_else(|| self.stale(loaded, name))?;
        let block = self.locate(&text, loaded, name)?;

        let mut config = ConfigText::new(&text);
        remove_from_block(&mut config, &block, name);

        write_config(self.path(), &config.into_string())?;

        tracing::info!(
            "Removed host '{}' from SSH config at {}",
            name,
            self.path().display()
        );
        Ok(())
    }

    /// Find the block in freshly read text that sits where `loaded` was
    fn locate(&self, text: &str, loaded: &RawBlock, name: &str) -> Result<RawBlock, SshConfigError> {
        assemble(text)
            .into_iter()
            .find(|b| b.line == loaded.line && b.declares(name))
            .ok_or_else(|| self.stale(loaded, name))
    }

    fn stale(&self, loaded: &RawBlock, name: &str) -> SshConfigError {
        SshConfigError::StaleEdit {
            path: self.path().to_path_buf(),
            line: loaded.line,
            name: name.to_string(),
        }
    }
}

/// Config text split into lines that keep their own terminators
struct ConfigText {
    lines: Vec<String>,
    newline: &'static str,
}

impl ConfigText {
    fn new(text: &str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
            newline,
        }
    }

    /// Line by 1-based number
    fn line(&self, number: usize) -> &str {
        &self.lines[number - 1]
    }

    fn terminated(&self, line: &str) -> String {
        if line.ends_with('\n') {
            line.to_string()
        } else {
            format!("{line}{}", self.newline)
        }
    }

    /// Replace 1-based lines `start..=end`
    fn splice(&mut self, start: usize, end: usize, replacement: Vec<String>) {
        let tail = self.lines.split_off(end);
        self.lines.truncate(start - 1);
        self.lines.extend(replacement);
        self.lines.extend(tail);
    }

    /// Drop one blank line at 0-based `at` if it would double up with the
    /// line before it (or lead the file), or a trailing blank at end of file
    fn collapse_blank(&mut self, at: usize) {
        let is_blank = |line: &String| line.trim().is_empty();

        let prev_blank = at == 0 || self.lines.get(at - 1).is_some_and(is_blank);
        if prev_blank && self.lines.get(at).is_some_and(is_blank) {
            self.lines.remove(at);
        } else if at == self.lines.len() && at > 0 && is_blank(&self.lines[at - 1]) {
            self.lines.remove(at - 1);
        }
    }

    fn into_string(self) -> String {
        self.lines.concat()
    }
}

fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn tag_comment(indent: &str, tags: &[String], newline: &str) -> String {
    format!("{indent}# Tags: {}{newline}", tags.join(", "))
}

/// Rewrite `block` to carry the entry's modelled values and tags.
///
/// The first line of each modelled keyword is rewritten in place, keeping its
/// indentation and keyword spelling. A cleared field drops every line of that
/// keyword. Fields the block lacks are added after its last directive.
fn update_block(config: &mut ConfigText, block: &RawBlock, entry: &HostEntry) {
    let values = entry.modeled_values();
    let mut written = [false; MODELED_KEYWORDS.len()];
    let newline = config.newline;

    let directive_indent = block
        .directives
        .first()
        .map_or(DEFAULT_INDENT, |d| indent_of(config.line(d.line)))
        .to_string();

    let mut out = Vec::new();

    for number in block.start_line()..=block.end_line() {
        let raw = config.line(number);

        if block.tag_line == Some(number) {
            if !entry.tags.is_empty() {
                out.push(tag_comment(indent_of(raw), &entry.tags, newline));
            }
            continue;
        }

        if number == block.line {
            if block.tag_line.is_none() && !entry.tags.is_empty() {
                out.push(tag_comment(indent_of(raw), &entry.tags, newline));
            }
            out.push(config.terminated(raw));
            continue;
        }

        let modeled = block
            .directives
            .iter()
            .find(|d| d.line == number)
            .and_then(|d| {
                MODELED_KEYWORDS
                    .iter()
                    .position(|k| k.eq_ignore_ascii_case(&d.keyword))
                    .map(|slot| (d, slot))
            });

        match modeled {
            Some((_, slot)) if values[slot].1.is_none() => {}
            Some((directive, slot)) if !written[slot] => {
                written[slot] = true;
                let value = values[slot].1.as_deref().unwrap_or_default();
                out.push(format!(
                    "{}{} {value}{newline}",
                    indent_of(raw),
                    directive.keyword
                ));
            }
            _ => out.push(config.terminated(raw)),
        }
    }

    for (slot, (keyword, value)) in values.iter().enumerate() {
        if let (false, Some(value)) = (written[slot], value) {
            out.push(format!("{directive_indent}{keyword} {value}{newline}"));
        }
    }

    config.splice(block.start_line(), block.end_line(), out);
}

fn remove_from_block(config: &mut ConfigText, block: &RawBlock, name: &str) {
    let remaining: Vec<&str> = block
        .patterns
        .iter()
        .map(String::as_str)
        .filter(|p| *p != name)
        .collect();

    // Negations alone would leave a block that matches nothing
    if remaining.iter().any(|p| !p.starts_with('!')) {
        let raw = config.line(block.line);
        let (keyword, _) = split_keyword(raw.trim());
        let host_line = format!(
            "{}{keyword} {}{}",
            indent_of(raw),
            remaining.join(" "),
            config.newline
        );
        config.splice(block.line, block.line, vec![host_line]);
        return;
    }

    let start = block.start_line();
    config.splice(start, block.end_line(), Vec::new());
    config.collapse_blank(start - 1);
}

fn render_block(entry: &HostEntry, newline: &str) -> String {
    let mut block = String::new();

    if !entry.tags.is_empty() {
        block.push_str(&tag_comment("", &entry.tags, newline));
    }
    block.push_str(&format!("Host {}{newline}", entry.name));

    for (keyword, value) in entry.modeled_values() {
        if let Some(value) = value {
            block.push_str(&format!("{DEFAULT_INDENT}{keyword} {value}{newline}"));
        }
    }
    for (keyword, value) in &entry.options {
        block.push_str(&format!("{DEFAULT_INDENT}{keyword} {value}{newline}"));
    }

    block
}

/// Append a new block after a blank separator line
fn append_block(text: &str, entry: &HostEntry) -> String {
    let config = ConfigText::new(text);
    let newline = config.newline;
    let mut out = text.to_string();

    if !out.is_empty() {
        let last_blank = config.lines.last().is_some_and(|l| l.trim().is_empty());
        if !out.ends_with('\n') {
            out.push_str(newline);
        }
        if !last_blank {
            out.push_str(newline);
        }
    }

    out.push_str(&render_block(entry, newline));
    out
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Write the whole config file, keeping a `.bak` copy of the previous one.
///
/// The new text goes to a temporary file next to the target, which is then
/// renamed over it; a failed write leaves the old file intact. Creates the
/// parent directory (0700) and the file (0600) when missing.
fn write_config(path: &Path, text: &str) -> Result<(), SshConfigError> {
    let write_err = |reason: String| SshConfigError::Write {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| write_err(format!("Failed to create {}: {e}", dir.display())))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
                    .map_err(|e| write_err(format!("Failed to set directory permissions: {e}")))?;
            }
        }
    }

    // Replace the file a symlink points at, not the link itself
    let existed = path.exists();
    let target = if existed {
        fs::canonicalize(path).map_err(|e| write_err(e.to_string()))?
    } else {
        path.to_path_buf()
    };

    let mut saved = None;
    if existed {
        let backup = backup_path(path);
        fs::copy(&target, &backup)
            .map_err(|e| write_err(format!("Failed to create backup: {e}")))?;
        tracing::debug!("Created SSH config backup: {}", backup.display());
        saved = Some(backup);
    }
    let io_err = |e: std::io::Error| {
        write_err(match &saved {
            Some(backup) => format!("{e} (previous contents saved to {})", backup.display()),
            None => e.to_string(),
        })
    };

    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(text.as_bytes()).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;

    if existed {
        let permissions = fs::metadata(&target).map_err(io_err)?.permissions();
        fs::set_permissions(temp.path(), permissions).map_err(io_err)?;
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
    }

    temp.persist(&target).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh_config::schema::HostRecord;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    const MIXED: &str = "\
# global defaults
Host *
    ServerAliveInterval 30

# Tags: web
Host web
    HostName 10.0.0.1
    User old
    # keep me
    Compression yes

Host db
    HostName 10.0.0.2
    ForwardAgent yes
";

    #[test]
    fn upsert_existing_edits_only_its_block() {
        let (_dir, path) = setup(MIXED);
        let registry = HostRegistry::load(&path).unwrap();

        let mut entry = registry.entry("web").unwrap();
        entry.user = Some("deploy".to_string());
        entry.port = Some(2222);
        entry.tags.push("prod".to_string());
        registry.upsert(&entry).unwrap();

        assert_eq!(
            read(&path),
            "\
# global defaults
Host *
    ServerAliveInterval 30

# Tags: web, prod
Host web
    HostName 10.0.0.1
    User deploy
    # keep me
    Compression yes
    Port 2222

Host db
    HostName 10.0.0.2
    ForwardAgent yes
"
        );

        let reloaded = HostRegistry::load(&path).unwrap();
        let web = reloaded.get("web").unwrap();
        assert_eq!(web.user.as_deref(), Some("deploy"));
        assert_eq!(web.port, Some(2222));
        assert_eq!(web.tags, vec!["web", "prod"]);
        assert_eq!(web.source_line, 6);

        // Hosts after the edited block shift by the inserted line only
        let before = registry.get("db").unwrap();
        let after = reloaded.get("db").unwrap();
        assert_eq!(after.source_line, before.source_line + 1);
        assert_eq!(
            HostRecord {
                source_line: before.source_line,
                ..after
            },
            before
        );
    }

    #[test]
    fn same_size_update_keeps_every_other_host_identical() {
        let (_dir, path) = setup(MIXED);
        let before = HostRegistry::load(&path).unwrap();

        let entry = before.entry("web").unwrap().with_hostname("10.9.9.9");
        before.upsert(&entry).unwrap();

        let after = HostRegistry::load(&path).unwrap();
        assert_eq!(after.names(), before.names());
        assert_eq!(after.get("db").unwrap(), before.get("db").unwrap());
        assert_eq!(read(&path), MIXED.replace("10.0.0.1", "10.9.9.9"));
    }

    #[test]
    fn upsert_clears_every_occurrence_of_removed_field() {
        let (_dir, path) = setup("Host a\n    User x\n    Port 1\n    user y\n");
        let registry = HostRegistry::load(&path).unwrap();

        let mut entry = registry.entry("a").unwrap();
        entry.user = None;
        registry.upsert(&entry).unwrap();

        assert_eq!(read(&path), "Host a\n    Port 1\n");
    }

    #[test]
    fn upsert_keeps_keyword_spelling_and_indentation() {
        let (_dir, path) = setup("Host a\n\thostname old.example\n");
        let registry = HostRegistry::load(&path).unwrap();

        let entry = registry.entry("a").unwrap().with_hostname("new.example");
        registry.upsert(&entry).unwrap();

        assert_eq!(read(&path), "Host a\n\thostname new.example\n");
    }

    #[test]
    fn upsert_on_empty_block_inserts_after_host_line() {
        let (_dir, path) = setup("Host a\nHost b\n    User keep\n");
        let registry = HostRegistry::load(&path).unwrap();

        let entry = HostEntry::new("a").with_user("u").with_tag("t");
        registry.upsert(&entry).unwrap();

        assert_eq!(
            read(&path),
            "# Tags: t\nHost a\n    User u\nHost b\n    User keep\n"
        );
    }

    #[test]
    fn upsert_removes_tag_comment_when_tags_cleared() {
        let (_dir, path) = setup("# Tags: a, b\nHost x\n    User u\n");
        let registry = HostRegistry::load(&path).unwrap();

        let mut entry = registry.entry("x").unwrap();
        entry.tags.clear();
        registry.upsert(&entry).unwrap();

        assert_eq!(read(&path), "Host x\n    User u\n");
    }

    #[test]
    fn upsert_preserves_crlf() {
        let (_dir, path) = setup("Host a\r\n    User x\r\n");
        let registry = HostRegistry::load(&path).unwrap();

        let entry = registry
            .entry("a")
            .unwrap()
            .with_user("y")
            .with_hostname("h");
        registry.upsert(&entry).unwrap();

        assert_eq!(read(&path), "Host a\r\n    User y\r\n    HostName h\r\n");
    }

    #[test]
    fn upsert_new_host_appends_with_separator() {
        let (_dir, path) = setup("Host a\n    User x");
        let registry = HostRegistry::load(&path).unwrap();

        let entry = HostEntry::new("b")
            .with_hostname("h")
            .with_tag("t")
            .with_option("ForwardAgent", "yes");
        registry.add(&entry).unwrap();

        assert_eq!(
            read(&path),
            "Host a\n    User x\n\n# Tags: t\nHost b\n    HostName h\n    ForwardAgent yes\n"
        );

        let reloaded = HostRegistry::load(&path).unwrap();
        assert_eq!(reloaded.get("a").unwrap().source_line, 1);
        assert_eq!(reloaded.get("b").unwrap().source_line, 5);
    }

    #[test]
    fn add_existing_host_fails() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        assert!(matches!(
            registry.add(&HostEntry::new("a")),
            Err(SshConfigError::AlreadyExists { .. })
        ));
        assert_eq!(read(&path), "Host a\n");
    }

    #[test]
    fn add_host_declared_by_concurrent_writer_fails() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        fs::write(&path, "Host a\nHost b\n").unwrap();

        assert!(matches!(
            registry.upsert(&HostEntry::new("b")),
            Err(SshConfigError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn add_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ssh").join("config");
        let registry = HostRegistry::load(&path).unwrap();

        registry
            .add(&HostEntry::new("b").with_hostname("h"))
            .unwrap();

        assert_eq!(read(&path), "Host b\n    HostName h\n");
        assert!(!backup_path(&path).exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn edit_detects_shifted_block() {
        let (_dir, path) = setup("Host a\n    User x\n");
        let registry = HostRegistry::load(&path).unwrap();
        fs::write(&path, "# inserted by someone else\nHost a\n    User x\n").unwrap();

        let entry = HostEntry::new("a").with_user("y");
        match registry.upsert(&entry) {
            Err(SshConfigError::StaleEdit { line, name, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(name, "a");
            }
            other => panic!("expected StaleEdit, got {other:?}"),
        }
        assert_eq!(read(&path), "# inserted by someone else\nHost a\n    User x\n");

        assert!(matches!(
            registry.remove("a"),
            Err(SshConfigError::StaleEdit { .. })
        ));
    }

    #[test]
    fn edit_detects_deleted_file() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            registry.upsert(&HostEntry::new("a").with_user("u")),
            Err(SshConfigError::StaleEdit { .. })
        ));
    }

    #[test]
    fn invalid_entry_leaves_file_untouched() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();

        assert!(registry.upsert(&HostEntry::new("bad name")).is_err());
        assert!(registry.upsert(&HostEntry::new("a").with_user("")).is_err());
        assert_eq!(read(&path), "Host a\n");
    }

    #[test]
    fn remove_block_with_tags_and_collapse_blank() {
        let (_dir, path) = setup(
            "\
Host first
    User one

# Tags: t
Host gone
    User two

Host last
    User three
",
        );
        let registry = HostRegistry::load(&path).unwrap();
        registry.remove("gone").unwrap();

        assert_eq!(
            read(&path),
            "Host first\n    User one\n\nHost last\n    User three\n"
        );
    }

    #[test]
    fn remove_last_block_drops_trailing_separator() {
        let (_dir, path) = setup("Host a\n    User x\n\nHost b\n    User y\n");
        let registry = HostRegistry::load(&path).unwrap();
        registry.remove("b").unwrap();

        assert_eq!(read(&path), "Host a\n    User x\n");
    }

    #[test]
    fn remove_alias_keeps_shared_block() {
        let (_dir, path) = setup("  Host a b\n    User x\n");
        let registry = HostRegistry::load(&path).unwrap();
        registry.remove("a").unwrap();

        assert_eq!(read(&path), "  Host b\n    User x\n");
        let reloaded = HostRegistry::load(&path).unwrap();
        assert!(!reloaded.contains("a"));
        assert_eq!(reloaded.get("b").unwrap().user.as_deref(), Some("x"));
    }

    #[test]
    fn remove_last_positive_alias_drops_block() {
        let (_dir, path) = setup("Host keep
Host a !b
    User x
");
        let registry = HostRegistry::load(&path).unwrap();
        registry.remove("a").unwrap();

        assert_eq!(read(&path), "Host keep
");
    }

    #[test]
    fn remove_unknown_host_is_not_found() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        assert!(registry.remove("zzz").unwrap_err().is_not_found());
    }

    #[test]
    fn writes_keep_backup_of_previous_contents() {
        let (_dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        registry.add(&HostEntry::new("b")).unwrap();

        assert_eq!(read(&backup_path(&path)), "Host a\n");
        assert_eq!(read(&path), "Host a\n\nHost b\n");
    }

    #[test]
    fn writes_replace_file_without_leftovers() {
        let (dir, path) = setup("Host a\n");
        let registry = HostRegistry::load(&path).unwrap();
        registry.add(&HostEntry::new("b")).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["config", "config.bak"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_config_stays_a_link() {
        let (dir, real) = setup("Host a\n    User x\n");
        let link = dir.path().join("linked");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let registry = HostRegistry::load(&link).unwrap();
        registry.upsert(&HostEntry::new("a").with_user("y")).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(read(&real), "Host a\n    User y\n");
        assert_eq!(read(&backup_path(&link)), "Host a\n    User x\n");
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = setup("Host a\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let registry = HostRegistry::load(&path).unwrap();
        registry.add(&HostEntry::new("b")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/home/u/.ssh/config")),
            PathBuf::from("/home/u/.ssh/config.bak")
        );
        assert_eq!(
            backup_path(Path::new("/etc/ssh/my.conf")),
            PathBuf::from("/etc/ssh/my.conf.bak")
        );
    }
}
