//! sshm edit - Edit a host's block in place

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sshm_core::{HostRegistry, resolve_config_path};

/// Arguments for the edit command
#[derive(Args)]
pub struct EditArgs {
    /// Name of the host to edit
    pub name: String,

    /// New hostname (use empty string to clear)
    #[arg(long)]
    pub hostname: Option<String>,

    /// New SSH username (use empty string to clear)
    #[arg(short, long)]
    pub user: Option<String>,

    /// New SSH port (use empty string to clear)
    #[arg(short, long)]
    pub port: Option<String>,

    /// New identity file path (use empty string to clear)
    #[arg(short, long)]
    pub identity_file: Option<String>,

    /// New jump host (use empty string to clear)
    #[arg(short = 'J', long)]
    pub proxy_jump: Option<String>,

    /// New ProxyCommand (use empty string to clear)
    #[arg(long)]
    pub proxy_command: Option<String>,

    /// New RemoteCommand (use empty string to clear)
    #[arg(long)]
    pub remote_command: Option<String>,

    /// New RequestTTY setting (use empty string to clear)
    #[arg(long)]
    pub request_tty: Option<String>,

    /// Add a tag
    #[arg(long)]
    pub add_tag: Vec<String>,

    /// Remove a tag
    #[arg(long)]
    pub remove_tag: Vec<String>,
}

/// Apply an optional new value; an empty string clears the field
fn apply(field: &mut Option<String>, value: Option<&str>) -> bool {
    match value {
        Some(value) => {
            *field = (!value.is_empty()).then(|| value.to_string());
            true
        }
        None => false,
    }
}

pub fn cmd_edit(args: &EditArgs, config: Option<&Path>, quiet: bool) -> Result<()> {
    let path = resolve_config_path(config)?;
    let registry = HostRegistry::load(&path)?;
    let mut entry = registry.entry(&args.name)?;

    let mut changed = false;

    changed |= apply(&mut entry.hostname, args.hostname.as_deref());
    changed |= apply(&mut entry.user, args.user.as_deref());
    changed |= apply(&mut entry.identity_file, args.identity_file.as_deref());
    changed |= apply(&mut entry.proxy_jump, args.proxy_jump.as_deref());
    changed |= apply(&mut entry.proxy_command, args.proxy_command.as_deref());
    changed |= apply(&mut entry.remote_command, args.remote_command.as_deref());
    changed |= apply(&mut entry.request_tty, args.request_tty.as_deref());

    if let Some(port) = &args.port {
        entry.port = if port.is_empty() {
            None
        } else {
            Some(
                port.parse()
                    .with_context(|| format!("Invalid port '{port}'"))?,
            )
        };
        changed = true;
    }

    for tag in &args.add_tag {
        if !entry.tags.contains(tag) {
            entry.tags.push(tag.clone());
            changed = true;
        }
    }

    for tag in &args.remove_tag {
        if let Some(pos) = entry.tags.iter().position(|t| t == tag) {
            entry.tags.remove(pos);
            changed = true;
        }
    }

    if !changed {
        if !quiet {
            println!("No changes specified. Use --help to see available options.");
        }
        return Ok(());
    }

    registry.upsert(&entry)?;

    if !quiet {
        println!(
            "{} Host '{}' updated.",
            style("Updated:").green(),
            style(&args.name).cyan()
        );
        println!(
            "  {} {}",
            style("View changes:").dim(),
            style(format!("sshm info {} --pretty", args.name)).yellow()
        );
    }

    Ok(())
}
