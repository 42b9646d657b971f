//! Tests for the fetch subcommand and its config overrides.

use super::parse;
use crate::cli::commands::summary_lines;
use crate::cli::{Cli, CliCommand, FetchArgs};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use zipfetch_core::config::FetchConfig;
use zipfetch_core::progress::{BatchSummary, FailedItem};
use zipfetch_core::transfer::SkipPolicy;
use zipfetch_core::DownloadDescriptor;

#[test]
fn cli_parse_fetch_defaults() {
    match parse(&["zipfetch", "fetch", "2020"]) {
        CliCommand::Fetch { year, opts } => {
            assert_eq!(year, "2020");
            assert!(opts.concurrency.is_none());
            assert!(opts.dest.is_none());
            assert!(!opts.force_refresh);
            assert!(!opts.skip_existing);
            assert!(opts.max_attempts.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_flags() {
    match parse(&[
        "zipfetch",
        "fetch",
        "2019",
        "--concurrency",
        "8",
        "--dest",
        "/tmp/zips",
        "--catalogue",
        "list.json",
        "--max-attempts",
        "5",
        "--force-refresh",
    ]) {
        CliCommand::Fetch { year, opts } => {
            assert_eq!(year, "2019");
            assert_eq!(opts.concurrency, Some(8));
            assert_eq!(opts.dest, Some(PathBuf::from("/tmp/zips")));
            assert_eq!(opts.catalogue, Some(PathBuf::from("list.json")));
            assert_eq!(opts.max_attempts, Some(5));
            assert!(opts.force_refresh);
        }
        _ => panic!("expected Fetch with flags"),
    }
}

#[test]
fn cli_fetch_requires_year() {
    assert!(Cli::try_parse_from(["zipfetch", "fetch"]).is_err());
}

#[test]
fn cli_force_refresh_conflicts_with_skip_existing() {
    assert!(
        Cli::try_parse_from(["zipfetch", "fetch", "2020", "--force-refresh", "--skip-existing"])
            .is_err()
    );
}

#[test]
fn fetch_args_override_config() {
    let mut cfg = FetchConfig::default();
    let args = FetchArgs {
        concurrency: Some(2),
        dest: Some(PathBuf::from("out")),
        skip_existing: true,
        max_attempts: Some(7),
        ..FetchArgs::default()
    };
    args.apply(&mut cfg);
    assert_eq!(cfg.concurrency, 2);
    assert_eq!(cfg.destination_dir, PathBuf::from("out"));
    assert_eq!(cfg.skip_policy, SkipPolicy::Exists);
    assert_eq!(cfg.retry_policy().max_attempts, 7);
    assert!(!cfg.force_refresh);
}

#[test]
fn empty_fetch_args_keep_config() {
    let mut cfg = FetchConfig::default();
    cfg.concurrency = 9;
    FetchArgs::default().apply(&mut cfg);
    assert_eq!(cfg.concurrency, 9);
    assert_eq!(cfg.skip_policy, SkipPolicy::SizeMatch);
    assert!(cfg.retry.is_none());
}

#[test]
fn summary_lists_each_failure() {
    let mut summary = BatchSummary::new(3);
    summary.completed = 1;
    summary.skipped = 1;
    summary.exhausted = 1;
    summary.elapsed = Duration::from_secs(2);
    summary.failures.push(FailedItem {
        descriptor: DownloadDescriptor::new("acme", "2020", "a.zip", "https://example.com/a.zip"),
        attempts: 3,
        error: "HTTP 500".to_string(),
    });
    let lines = summary_lines(&summary);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("3 archive(s): 1 downloaded, 1 skipped, 1 failed, 0 cancelled."));
    assert_eq!(
        lines[1],
        "  failed: acme/2020/a.zip after 3 attempt(s): HTTP 500 (https://example.com/a.zip)"
    );
}

#[test]
fn summary_marks_entries_rejected_before_download() {
    let mut summary = BatchSummary::new(2);
    summary.completed = 1;
    summary.exhausted = 1;
    summary.failures.push(FailedItem {
        descriptor: DownloadDescriptor::new("b", "2020", "x.zip", "https://example.com/b/x.zip"),
        attempts: 0,
        error: "local file x.zip is already written by a/2020/x.zip".to_string(),
    });
    let lines = summary_lines(&summary);
    assert_eq!(
        lines[1],
        "  rejected: b/2020/x.zip: local file x.zip is already written by a/2020/x.zip"
    );
}
