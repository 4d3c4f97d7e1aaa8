//! Tests for resolve, script and the global --config flag.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_resolve() {
    match parse(&["tinyprem", "resolve"]) {
        CliCommand::Resolve { json } => assert!(!json),
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_json() {
    match parse(&["tinyprem", "resolve", "--json"]) {
        CliCommand::Resolve { json } => assert!(json),
        _ => panic!("expected Resolve with json"),
    }
}

#[test]
fn cli_parse_script() {
    match parse(&["tinyprem", "script"]) {
        CliCommand::Script { debug } => assert!(!debug),
        _ => panic!("expected Script"),
    }
}

#[test]
fn cli_parse_script_debug() {
    match parse(&["tinyprem", "script", "--debug"]) {
        CliCommand::Script { debug } => assert!(debug),
        _ => panic!("expected Script with debug"),
    }
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = Cli::try_parse_from(["tinyprem", "script", "--config", "/etc/tinyprem.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/tinyprem.toml")));
}

#[test]
fn cli_parse_without_config() {
    let cli = Cli::try_parse_from(["tinyprem", "resolve"]).unwrap();
    assert!(cli.config.is_none());
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["tinyprem"]).is_err());
}
