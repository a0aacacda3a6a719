//! sshm CLI - browse, inspect, edit, and connect to hosts from an SSH config
//!
//! This module contains the argument parsing and command dispatch used by
//! the `sshm` binary.

mod commands;
mod output;

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use sshm_core::{get_version, get_version_long};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Manage and connect to hosts in your SSH config
#[derive(Parser)]
#[command(name = "sshm")]
#[command(version = get_version(), long_version = get_version_long())]
#[command(about = "Manage and connect to hosts in your SSH config", long_about = None)]
#[command(override_usage = "sshm [OPTIONS] <COMMAND>\n       sshm [OPTIONS] [-t] <HOST> [COMMAND...]")]
#[command(allow_external_subcommands = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SSH config file to use (default: ~/.ssh/config)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force pseudo-terminal allocation when connecting
    #[arg(short, long)]
    tty: bool,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print machine-readable information (JSON) about a host
    Info(commands::InfoArgs),
    /// List hosts from the SSH config
    #[command(alias = "ls")]
    List(commands::ListArgs),
    /// Add a new host block
    Add(commands::AddArgs),
    /// Edit a host's block in place
    Edit(commands::EditArgs),
    /// Remove a host
    #[command(alias = "rm")]
    Remove(commands::RemoveArgs),
    /// Generate a shell completion script
    Completion(commands::CompletionArgs),
    /// Print host names matching a prefix (used by completion scripts)
    #[command(hide = true)]
    CompleteHosts(commands::CompleteHostsArgs),
    /// Connect to a host: `sshm <host> [command...]`
    #[command(external_subcommand)]
    Connect(Vec<OsString>),
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise each `-v` raises the level one step
/// from `warn`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let config = cli.config.as_deref();

    let result = match cli.command {
        Some(Commands::Info(args)) => commands::cmd_info(&args, config),
        Some(Commands::List(args)) => commands::cmd_list(&args, config, cli.quiet),
        Some(Commands::Add(args)) => commands::cmd_add(&args, config, cli.quiet),
        Some(Commands::Edit(args)) => commands::cmd_edit(&args, config, cli.quiet),
        Some(Commands::Remove(args)) => commands::cmd_remove(&args, config, cli.quiet),
        Some(Commands::Completion(args)) => commands::cmd_completion(&args),
        Some(Commands::CompleteHosts(args)) => commands::cmd_complete_hosts(&args, config),
        Some(Commands::Connect(raw)) => commands::ConnectArgs::from_external(raw, cli.tty)
            .and_then(|args| commands::cmd_connect(&args, config, cli.quiet)),
        None => {
            // No host or command - show a welcome message and hint to use --help
            if !cli.quiet {
                println!(
                    "{} {}",
                    style("sshm").cyan().bold(),
                    style(get_version()).dim()
                );
                println!();
                println!(
                    "Run {} to see your hosts, or {} to connect.",
                    style("sshm list").green(),
                    style("sshm <host>").green()
                );
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        output::show_error(&e);
        std::process::exit(1);
    }
    Ok(())
}
