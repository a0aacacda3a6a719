//! sshm add - Add a new host block to the SSH config

use std::path::Path;

use anyhow::{Result, bail};
use clap::Args;
use console::style;
use sshm_core::{HostEntry, HostRegistry, resolve_config_path};

/// Arguments for the add command
#[derive(Args)]
pub struct AddArgs {
    /// Name to identify this host (e.g., "prod-1", "staging")
    pub name: String,

    /// SSH hostname or IP address
    pub hostname: String,

    /// SSH username
    #[arg(short, long)]
    pub user: Option<String>,

    /// SSH port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to SSH identity file (private key)
    #[arg(short, long)]
    pub identity_file: Option<String>,

    /// Jump host for ProxyJump (user@host:port format)
    #[arg(short = 'J', long)]
    pub proxy_jump: Option<String>,

    /// ProxyCommand to reach the host
    #[arg(long)]
    pub proxy_command: Option<String>,

    /// Command to run on the remote host after connecting
    #[arg(long)]
    pub remote_command: Option<String>,

    /// RequestTTY setting (yes, no, force, auto)
    #[arg(long)]
    pub request_tty: Option<String>,

    /// Tag for organization (can be specified multiple times)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Extra directive as KEYWORD=VALUE (can be specified multiple times)
    #[arg(short, long = "option", value_name = "KEYWORD=VALUE")]
    pub options: Vec<String>,
}

/// Split `Keyword=Value` or `Keyword Value` into its two parts
pub(crate) fn parse_option(raw: &str) -> Result<(String, String)> {
    let raw = raw.trim();
    let split = raw
        .split_once('=')
        .or_else(|| raw.split_once(char::is_whitespace));

    match split {
        Some((keyword, value)) if !keyword.trim().is_empty() && !value.trim().is_empty() => {
            Ok((keyword.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Invalid option '{raw}'. Expected KEYWORD=VALUE, e.g. ForwardAgent=yes"),
    }
}

impl AddArgs {
    fn to_entry(&self) -> Result<HostEntry> {
        Ok(HostEntry {
            name: self.name.clone(),
            hostname: Some(self.hostname.clone()),
            user: self.user.clone(),
            port: self.port,
            identity_file: self.identity_file.clone(),
            proxy_jump: self.proxy_jump.clone(),
            proxy_command: self.proxy_command.clone(),
            remote_command: self.remote_command.clone(),
            request_tty: self.request_tty.clone(),
            tags: self.tags.clone(),
            options: self
                .options
                .iter()
                .map(String::as_str)
                .map(parse_option)
                .collect::<Result<_>>()?,
        })
    }
}

pub fn cmd_add(args: &AddArgs, config: Option<&Path>, quiet: bool) -> Result<()> {
    let path = resolve_config_path(config)?;
    let registry = HostRegistry::load(&path)?;

    let entry = args.to_entry()?;
    registry.add(&entry)?;

    if !quiet {
        println!(
            "{} Host '{}' added to {}",
            style("Added:").green(),
            style(&args.name).cyan(),
            path.display()
        );
        println!(
            "  {} {}",
            style("Connect with:").dim(),
            style(format!("sshm {}", args.name)).yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_option_forms() {
        assert_eq!(
            parse_option("ForwardAgent=yes").unwrap(),
            ("ForwardAgent".to_string(), "yes".to_string())
        );
        assert_eq!(
            parse_option("ServerAliveInterval 60").unwrap(),
            ("ServerAliveInterval".to_string(), "60".to_string())
        );
        assert_eq!(
            parse_option(" LocalForward = 8080 localhost:80 ").unwrap(),
            ("LocalForward".to_string(), "8080 localhost:80".to_string())
        );
        assert!(parse_option("Compression").is_err());
        assert!(parse_option("=yes").is_err());
    }

    #[test]
    fn add_writes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        let args = AddArgs {
            name: "web".to_string(),
            hostname: "10.0.0.5".to_string(),
            user: Some("deploy".to_string()),
            port: None,
            identity_file: None,
            proxy_jump: None,
            proxy_command: None,
            remote_command: None,
            request_tty: None,
            tags: vec!["prod".to_string()],
            options: vec!["ForwardAgent=yes".to_string()],
        };
        cmd_add(&args, Some(&path), true).unwrap();

        let record = HostRegistry::load(&path).unwrap().get("web").unwrap();
        assert_eq!(record.hostname.as_deref(), Some("10.0.0.5"));
        assert_eq!(record.user.as_deref(), Some("deploy"));
        assert_eq!(record.tags, vec!["prod"]);
        assert_eq!(record.options.as_deref(), Some("ForwardAgent yes"));

        // Second add of the same name is rejected
        assert!(cmd_add(&args, Some(&path), true).is_err());
    }
}
