//! Tests for probe and completions.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_probe() {
    match parse(&["rangedl", "probe", "http://localhost:8080/my-local-file.txt"]) {
        CliCommand::Probe { url } => assert_eq!(url, "http://localhost:8080/my-local-file.txt"),
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["rangedl", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}
