//! sshm list - List hosts from the SSH config

use std::path::Path;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table};
use console::style;
use sshm_core::{HostRecord, HostRegistry, resolve_config_path};

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Filter by tag (case-insensitive)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Show only host names (for scripting)
    #[arg(long)]
    pub names_only: bool,

    /// Output effective host records as JSON
    #[arg(long, conflicts_with = "names_only")]
    pub json: bool,
}

fn filter_by_tag(records: Vec<HostRecord>, tag: Option<&str>) -> Vec<HostRecord> {
    match tag {
        Some(tag) => records.into_iter().filter(|r| r.has_tag(tag)).collect(),
        None => records,
    }
}

/// Names for `--names-only`, read from the declarations and tag comments
/// so a host whose fields fail to merge is still listed.
fn names_matching(registry: &HostRegistry, tag: Option<&str>) -> Vec<String> {
    registry
        .names()
        .iter()
        .filter(|name| match tag {
            Some(tag) => registry
                .tags(name)
                .is_some_and(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(tag))),
            None => true,
        })
        .cloned()
        .collect()
}

fn build_table(records: &[HostRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Name", "Hostname", "User", "Port", "Tags"]);

    for record in records {
        let port_str = record
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "22".to_string());
        let tags_str = if record.tags.is_empty() {
            "-".to_string()
        } else {
            record.tags.join(", ")
        };

        table.add_row(vec![
            Cell::new(&record.name).fg(Color::Cyan),
            Cell::new(record.hostname.as_deref().unwrap_or(&record.name)),
            Cell::new(record.user.as_deref().unwrap_or("-")),
            Cell::new(port_str),
            Cell::new(tags_str),
        ]);
    }

    table
}

pub fn cmd_list(args: &ListArgs, config: Option<&Path>, quiet: bool) -> Result<()> {
    let path = resolve_config_path(config)?;
    let registry = HostRegistry::load(&path)?;

    // Names only mode (for scripting)
    if !args.json && (args.names_only || quiet) {
        for name in names_matching(&registry, args.tag.as_deref()) {
            println!("{name}");
        }
        return Ok(());
    }

    let records = filter_by_tag(registry.list(), args.tag.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        match &args.tag {
            Some(tag) => println!("No hosts found with tag '{tag}'."),
            None => {
                println!("No hosts configured in {}.", path.display());
                println!();
                println!(
                    "  {} {}",
                    style("Add one with:").dim(),
                    style("sshm add <name> <hostname>").yellow()
                );
            }
        }
        return Ok(());
    }

    println!("{}", build_table(&records));

    println!();
    println!(
        "  {} {}",
        style("Config file:").dim(),
        style(path.display()).dim()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> HostRegistry {
        HostRegistry::parse(
            "/tmp/config",
            "# Tags: Prod\nHost a\n    HostName a.example\nHost b\n    User bob\n    Port 2200\n",
        )
    }

    #[test]
    fn tag_filter_ignores_case() {
        let records = filter_by_tag(registry().list(), Some("prod"));
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn no_filter_keeps_order() {
        let records = filter_by_tag(registry().list(), None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "b");
    }

    #[test]
    fn table_shows_defaults() {
        let table = build_table(&registry().list()).to_string();
        assert!(table.contains("a.example"));
        assert!(table.contains("2200"));
        assert!(table.contains("22 "));
        assert!(table.contains("Prod"));
    }

    const BAD_PORT: &str = "Host good\n    HostName g\n# Tags: db\nHost bad\n    Port abc\n";

    #[test]
    fn names_only_lists_host_with_bad_port() {
        let registry = HostRegistry::parse("/tmp/config", BAD_PORT);
        assert_eq!(names_matching(&registry, None), vec!["good", "bad"]);
        assert_eq!(names_matching(&registry, Some("DB")), vec!["bad"]);
        assert!(names_matching(&registry, Some("web")).is_empty());
    }

    #[test]
    fn table_skips_only_the_bad_host() {
        let registry = HostRegistry::parse("/tmp/config", BAD_PORT);
        let records = filter_by_tag(registry.list(), None);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["good"]);
    }

    #[test]
    fn list_command_succeeds_with_bad_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, BAD_PORT).unwrap();

        for names_only in [true, false] {
            let args = ListArgs {
                tag: None,
                names_only,
                json: false,
            };
            assert!(cmd_list(&args, Some(path.as_path()), false).is_ok());
        }
        let json = ListArgs {
            tag: Some("db".to_string()),
            names_only: false,
            json: true,
        };
        assert!(cmd_list(&json, Some(path.as_path()), false).is_ok());
    }
}
