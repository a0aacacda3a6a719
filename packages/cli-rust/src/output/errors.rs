//! Error display
//!
//! Formats command failures for the terminal, with a hint for the error
//! kinds a user can act on.

use console::style;
use sshm_core::SshConfigError;

/// A follow-up hint for errors the user can fix
fn error_tip(err: &SshConfigError) -> Option<String> {
    match err {
        SshConfigError::NotFound { .. } => Some(format!(
            "Use {} to see available hosts.",
            style("sshm list").green()
        )),
        SshConfigError::AlreadyExists { name } => Some(format!(
            "Use {} to change it.",
            style(format!("sshm edit {name}")).green()
        )),
        SshConfigError::StaleEdit { .. } => {
            Some("The file was edited elsewhere. Run the command again.".to_string())
        }
        SshConfigError::InvalidPort { name, .. } => Some(format!(
            "Fix the Port directive for '{name}' (1-65535) in the config file."
        )),
        SshConfigError::NoConfigPath => Some(format!(
            "Pass the config file explicitly with {}.",
            style("--config <FILE>").green()
        )),
        SshConfigError::Parse { .. } | SshConfigError::Write { .. } => {
            Some("Check that the file exists and that you can read and write it.".to_string())
        }
        SshConfigError::InvalidHostName { .. } | SshConfigError::InvalidValue { .. } => None,
    }
}

/// Print a command failure to stderr
pub fn show_error(err: &anyhow::Error) {
    eprintln!("{} {}", style("Error:").red().bold(), err);

    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", style("Caused by:").dim(), cause);
    }

    if let Some(tip) = err.downcast_ref::<SshConfigError>().and_then(error_tip) {
        eprintln!();
        eprintln!("  {} {}", style("Tip:").cyan(), tip);
    }
}
