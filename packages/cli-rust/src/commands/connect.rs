//! sshm <host> - Connect to a host with the system ssh client

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use console::style;
use sshm_core::{quick_host_exists, resolve_config_path};

/// Arguments for a direct connection, taken from the raw words after `sshm`
#[derive(Debug, PartialEq, Eq)]
pub struct ConnectArgs {
    /// Host name as declared in the SSH config
    pub host: String,

    /// Force pseudo-terminal allocation (`ssh -t`)
    pub tty: bool,

    /// Remote command words, passed through to ssh
    pub command: Vec<String>,
}

impl ConnectArgs {
    /// Build from `[host, words...]`. A `-t`/`--tty` right after the host
    /// counts as the tty flag rather than part of the remote command.
    pub fn from_external(raw: Vec<OsString>, tty: bool) -> Result<Self> {
        let mut words = raw.into_iter().map(|word| {
            word.into_string()
                .map_err(|w| anyhow!("Argument is not valid UTF-8: {}", w.to_string_lossy()))
        });

        let host = words
            .next()
            .ok_or_else(|| anyhow!("No host given"))??;
        let mut command = words.collect::<Result<Vec<_>>>()?;

        let mut tty = tty;
        if matches!(command.first().map(String::as_str), Some("-t" | "--tty")) {
            command.remove(0);
            tty = true;
        }

        Ok(Self { host, tty, command })
    }

    fn ssh_args(&self, config: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-F".into(), config.into()];
        if self.tty {
            args.push("-t".into());
        }
        args.push(self.host.clone().into());
        args.extend(self.command.iter().map(OsString::from));
        args
    }
}

pub fn cmd_connect(args: &ConnectArgs, config: Option<&Path>, quiet: bool) -> Result<()> {
    let path: PathBuf = resolve_config_path(config)?;

    if !quick_host_exists(&path, &args.host)? {
        eprintln!(
            "{} Host '{}' not found in SSH configuration.",
            style("Error:").red().bold(),
            args.host
        );
        eprintln!(
            "  {} Use {} to see available hosts.",
            style("Tip:").cyan(),
            style("sshm list").green()
        );
        std::process::exit(1);
    }

    if args.command.is_empty() && !quiet {
        println!("Connecting to {}...", style(&args.host).cyan());
    }

    let ssh_args = args.ssh_args(&path);
    tracing::debug!("Running ssh {:?}", ssh_args);

    let status = Command::new("ssh")
        .args(&ssh_args)
        .status()
        .context("Failed to run ssh. Is the OpenSSH client installed?")?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
