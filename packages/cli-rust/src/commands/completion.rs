//! sshm completion - Shell completion scripts and host name completion

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::Shell;
use sshm_core::{HostRegistry, resolve_config_path};

use crate::Cli;

/// Arguments for the completion command
#[derive(Args)]
pub struct CompletionArgs {
    /// Shell to generate the script for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Arguments for the hidden complete-hosts command
#[derive(Args)]
pub struct CompleteHostsArgs {
    /// Partial host name
    #[arg(default_value = "")]
    pub prefix: String,
}

/// Host name completion layered on top of the generated bash script
const BASH_HOSTS: &str = r#"
_sshm_hosts() {
    _sshm "$@"
    local cur="${COMP_WORDS[COMP_CWORD]}"
    if [[ ${COMP_CWORD} -eq 1 && ${cur} != -* ]] || \
       [[ ${COMP_CWORD} -eq 2 && ${COMP_WORDS[1]} =~ ^(info|edit|remove|rm)$ ]]; then
        COMPREPLY+=( $(sshm complete-hosts "${cur}" 2>/dev/null) )
    fi
}
complete -F _sshm_hosts -o bashdefault -o default sshm
"#;

const FISH_HOSTS: &str = r#"
complete -c sshm -n "__fish_use_subcommand" -f -a "(sshm complete-hosts (commandline -ct) 2>/dev/null)"
complete -c sshm -n "__fish_seen_subcommand_from info edit remove rm" -f -a "(sshm complete-hosts (commandline -ct) 2>/dev/null)"
"#;

/// Host name completion for zsh. Registered in place of the generated
/// `_sshm` so both kinds of candidates are offered.
const ZSH_HOSTS: &str = r#"
_sshm_hosts() {
    _sshm "$@"
    local cur="${words[CURRENT]}"
    if [[ ${cur} != -* ]] && { (( CURRENT == 2 )) || [[ CURRENT -eq 3 && ${words[2]} == (info|edit|remove|rm) ]] }; then
        local -a hosts
        hosts=( ${(f)"$(sshm complete-hosts "${cur}" 2>/dev/null)"} )
        (( ${#hosts} )) && compadd -a hosts
    fi
}

"#;

const ZSH_DISPATCH: &str = r#"if [ "$funcstack[1]" = "_sshm" ]; then"#;

/// Wraps the generated PowerShell completer, whose registration is rewritten
/// into an assignment to `$global:SshmClapCompleter`.
const POWERSHELL_HOSTS: &str = r#"
Register-ArgumentCompleter -Native -CommandName 'sshm' -ScriptBlock {
    param($wordToComplete, $commandAst, $cursorPosition)

    & $global:SshmClapCompleter $wordToComplete $commandAst $cursorPosition
    $words = @($commandAst.CommandElements | ForEach-Object { $_.ToString() })
    if ($wordToComplete -notlike '-*' -and
        ($words.Count -le 2 -or $words[1] -in 'info', 'edit', 'remove', 'rm')) {
        sshm complete-hosts $wordToComplete 2>$null | ForEach-Object {
            [CompletionResult]::new($_, $_, [CompletionResultType]::ParameterValue, $_)
        }
    }
}
"#;

const POWERSHELL_REGISTER: &str =
    "Register-ArgumentCompleter -Native -CommandName 'sshm' -ScriptBlock {";

const ELVISH_HOSTS: &str = r#"
var sshm-clap-completer = $edit:completion:arg-completer[sshm]
set edit:completion:arg-completer[sshm] = {|@words|
    $sshm-clap-completer $@words
    var n = (count $words)
    var cur = $words[-1]
    if (and (not (str:has-prefix $cur -)) (or (== $n 2) (and (== $n 3) (has-value [info edit remove rm] $words[1])))) {
        sshm complete-hosts $cur 2>/dev/null | from-lines
    }
}
"#;

/// Layer host name completion onto a generated script
fn add_host_hook(shell: Shell, script: String) -> String {
    match shell {
        Shell::Bash => script + BASH_HOSTS,
        Shell::Fish => script + FISH_HOSTS,
        Shell::Elvish => script + ELVISH_HOSTS,
        Shell::Zsh => match script.find(ZSH_DISPATCH) {
            Some(at) => {
                let (head, tail) = script.split_at(at);
                let tail = tail
                    .replacen("    _sshm \"$@\"", "    _sshm_hosts \"$@\"", 1)
                    .replacen("compdef _sshm sshm", "compdef _sshm_hosts sshm", 1);
                format!("{head}{ZSH_HOSTS}{tail}")
            }
            None => format!("{script}{ZSH_HOSTS}compdef _sshm_hosts sshm\n"),
        },
        Shell::PowerShell if script.contains(POWERSHELL_REGISTER) => {
            script.replacen(POWERSHELL_REGISTER, "$global:SshmClapCompleter = {", 1)
                + POWERSHELL_HOSTS
        }
        _ => script,
    }
}

fn write_completion(shell: Shell, out: &mut impl Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    let mut generated = Vec::new();
    clap_complete::generate(shell, &mut cmd, "sshm", &mut generated);

    let script = add_host_hook(shell, String::from_utf8_lossy(&generated).into_owned());
    out.write_all(script.as_bytes())
}

pub fn cmd_completion(args: &CompletionArgs) -> Result<()> {
    write_completion(args.shell, &mut io::stdout().lock())?;
    Ok(())
}

/// Host names matching `prefix`. Completion never fails loudly: an unreadable
/// config yields no candidates.
pub(crate) fn host_completions(config: Option<&Path>, prefix: &str) -> Vec<String> {
    let registry = resolve_config_path(config).and_then(HostRegistry::load);

    match registry {
        Ok(registry) => registry.complete(prefix),
        Err(e) => {
            tracing::debug!("Host completion unavailable: {}", e);
            Vec::new()
        }
    }
}

pub fn cmd_complete_hosts(args: &CompleteHostsArgs, config: Option<&Path>) -> Result<()> {
    let mut out = io::stdout().lock();
    for name in host_completions(config, &args.prefix) {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
