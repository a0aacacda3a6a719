//! sshm remove - Remove a host from the SSH config

use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Confirm;
use sshm_core::{HostRegistry, SshConfigError, resolve_config_path};

/// Arguments for the remove command
#[derive(Args)]
pub struct RemoveArgs {
    /// Name of the host to remove
    pub name: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

pub fn cmd_remove(args: &RemoveArgs, config: Option<&Path>, quiet: bool) -> Result<()> {
    let path = resolve_config_path(config)?;
    let registry = HostRegistry::load(&path)?;

    if !registry.contains(&args.name) {
        return Err(SshConfigError::NotFound {
            name: args.name.clone(),
        }
        .into());
    }

    // Confirm removal
    if !args.force {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "Remove host '{}' from {}?",
                args.name,
                path.display()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            if !quiet {
                println!("Cancelled.");
            }
            return Ok(());
        }
    }

    registry.remove(&args.name)?;

    if !quiet {
        println!(
            "{} Host '{}' removed.",
            style("Removed:").green(),
            style(&args.name).cyan()
        );
    }

    Ok(())
}
