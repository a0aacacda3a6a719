//! sshm info - Print machine-readable information about a host
//!
//! Output is one JSON document (schema `sshm.info.v1`) followed by a
//! newline. Exit status: 0 found, 2 not found, 1 any other config error.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sshm_core::{HostRecord, HostRegistry, SshConfigError, resolve_config_path};

const SCHEMA: &str = "sshm.info.v1";

/// Written when the response itself cannot be serialized
const INTERNAL_ERROR_JSON: &str = r#"{"schema":"sshm.info.v1","ok":false,"hostname":"","result":null,"error":{"code":"INTERNAL","message":"failed to marshal JSON","details":null}}"#;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Host name as declared in the SSH config
    pub host: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Serialize)]
struct InfoResponse<'a> {
    schema: &'static str,
    ok: bool,
    hostname: &'a str,
    result: Option<InfoResult<'a>>,
    error: Option<InfoError>,
}

#[derive(Serialize)]
struct InfoResult<'a> {
    canonical_name: &'a str,
    target: InfoTarget<'a>,
    identity_file: Option<&'a str>,
    proxy_jump: Option<&'a str>,
    proxy_command: Option<&'a str>,
    options: Option<&'a str>,
    tags: &'a [String],
    remote_command: Option<&'a str>,
    request_tty: Option<&'a str>,
    source: InfoSource,
}

#[derive(Serialize)]
struct InfoTarget<'a> {
    host: &'a str,
    hostname: Option<&'a str>,
    user: Option<&'a str>,
    port: Option<u16>,
}

#[derive(Serialize)]
struct InfoSource {
    file: String,
    line: usize,
}

#[derive(Serialize)]
struct InfoError {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl<'a> InfoResult<'a> {
    fn new(host: &'a str, record: &'a HostRecord) -> Self {
        Self {
            canonical_name: &record.name,
            target: InfoTarget {
                host,
                hostname: record.hostname.as_deref(),
                user: record.user.as_deref(),
                port: record.port,
            },
            identity_file: record.identity_file.as_deref(),
            proxy_jump: record.proxy_jump.as_deref(),
            proxy_command: record.proxy_command.as_deref(),
            options: record.options.as_deref(),
            tags: &record.tags,
            remote_command: record.remote_command.as_deref(),
            request_tty: record.request_tty.as_deref(),
            source: InfoSource {
                file: record.source_file.display().to_string(),
                line: record.source_line,
            },
        }
    }
}

/// Map a lookup failure to its JSON error and exit status
fn classify_error(err: &SshConfigError) -> (InfoError, i32) {
    let (code, message, status) = match err {
        SshConfigError::NotFound { .. } => ("NOT_FOUND", err.to_string(), 2),
        SshConfigError::InvalidPort { .. } => (
            "CONFIG_ERROR",
            "invalid port in host configuration".to_string(),
            1,
        ),
        _ => ("CONFIG_ERROR", err.to_string(), 1),
    };

    (
        InfoError {
            code,
            message,
            details: None,
        },
        status,
    )
}

fn write_info_json(out: &mut impl Write, pretty: bool, response: &InfoResponse<'_>) {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    };

    let written = match rendered {
        Ok(json) => writeln!(out, "{json}"),
        Err(e) => {
            tracing::error!("Failed to serialize info response: {}", e);
            writeln!(out, "{INTERNAL_ERROR_JSON}")
        }
    };
    if let Err(e) = written.and_then(|()| out.flush()) {
        tracing::warn!("Failed to write info output: {}", e);
    }
}

/// Look up `host` and write the JSON document to `out`. Returns the exit status.
pub fn run_info(out: &mut impl Write, host: &str, config: Option<&Path>, pretty: bool) -> i32 {
    let lookup = resolve_config_path(config)
        .and_then(HostRegistry::load)
        .and_then(|registry| registry.get(host));

    match lookup {
        Ok(record) => {
            let response = InfoResponse {
                schema: SCHEMA,
                ok: true,
                hostname: host,
                result: Some(InfoResult::new(host, &record)),
                error: None,
            };
            write_info_json(out, pretty, &response);
            0
        }
        Err(e) => {
            tracing::debug!("Info lookup for '{}' failed: {}", host, e);
            let (error, status) = classify_error(&e);
            let response = InfoResponse {
                schema: SCHEMA,
                ok: false,
                hostname: host,
                result: None,
                error: Some(error),
            };
            write_info_json(out, pretty, &response);
            status
        }
    }
}

pub fn cmd_info(args: &InfoArgs, config: Option<&Path>) -> Result<()> {
    let status = run_info(&mut io::stdout().lock(), &args.host, config, args.pretty);
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}
