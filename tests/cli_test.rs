//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

use blockaudit::cli::commands::patterns::PatternsCommands;
use blockaudit::cli::{Cli, Commands};

#[test]
fn test_parse_analyze_defaults() {
    let cli = Cli::try_parse_from(["blockaudit", "analyze"]).unwrap();
    assert!(!cli.json);
    assert!(cli.config.is_none());
    let Commands::Analyze(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    assert!(args.blocks.is_none());
    assert!(!args.fail_fast);
    assert!(!args.include_tests);
    assert!(args.output.is_none());
}

#[test]
fn test_parse_analyze_with_config_and_output() {
    let cli = Cli::try_parse_from([
        "blockaudit",
        "--config",
        "ci.yaml",
        "analyze",
        "--components",
        "src/components",
        "--compare-official",
        "--cache-ttl-secs",
        "120",
        "--output",
        "report.json",
    ])
    .unwrap();

    assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    let Commands::Analyze(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    assert_eq!(args.components, Some(PathBuf::from("src/components")));
    assert!(args.compare_official);
    assert_eq!(args.cache_ttl_secs, Some(120));
    assert_eq!(args.output, Some(PathBuf::from("report.json")));
}

#[test]
fn test_parse_patterns_fetch() {
    let cli = Cli::try_parse_from(["blockaudit", "patterns", "fetch", "--source", "website"]).unwrap();
    let Commands::Patterns(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    let PatternsCommands::Fetch { source } = args.command;
    assert_eq!(source.as_deref(), Some("website"));
}

#[test]
fn test_rejects_zero_like_garbage() {
    assert!(Cli::try_parse_from(["blockaudit", "analyze", "--batch-size", "many"]).is_err());
    assert!(Cli::try_parse_from(["blockaudit", "cache"]).is_err());
}
