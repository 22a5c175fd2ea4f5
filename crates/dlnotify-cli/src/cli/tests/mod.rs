//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_replay_defaults() {
    match parse(&["dlnotify", "replay", "events.jsonl"]) {
        CliCommand::Replay {
            path,
            interval_ms,
            linger_secs,
            dry_run,
        } => {
            assert_eq!(path, PathBuf::from("events.jsonl"));
            assert_eq!(interval_ms, 0);
            assert_eq!(linger_secs, 0);
            assert!(!dry_run);
        }
        _ => panic!("expected Replay"),
    }
}

#[test]
fn cli_parse_replay_options() {
    match parse(&[
        "dlnotify",
        "replay",
        "-",
        "--interval-ms",
        "1200",
        "--linger-secs",
        "70",
        "--dry-run",
    ]) {
        CliCommand::Replay {
            path,
            interval_ms,
            linger_secs,
            dry_run,
        } => {
            assert_eq!(path, PathBuf::from("-"));
            assert_eq!(interval_ms, 1200);
            assert_eq!(linger_secs, 70);
            assert!(dry_run);
        }
        _ => panic!("expected Replay"),
    }
}

#[test]
fn cli_parse_stats() {
    match parse(&["dlnotify", "stats"]) {
        CliCommand::Stats { json } => assert!(!json),
        _ => panic!("expected Stats"),
    }
    match parse(&["dlnotify", "stats", "--json"]) {
        CliCommand::Stats { json } => assert!(json),
        _ => panic!("expected Stats"),
    }
}

#[test]
fn cli_parse_sweep() {
    assert!(matches!(parse(&["dlnotify", "sweep"]), CliCommand::Sweep));
}

#[test]
fn cli_rejects_missing_replay_path() {
    assert!(Cli::try_parse_from(["dlnotify", "replay"]).is_err());
}
