//! CLI integration tests.
//!
//! Tests for argument parsing and how arguments become a run configuration.

use bw_preflight::cli::args::{Cli, Command, OutputFormat};
use bw_preflight::{ConfigError, PreflightConfig, Tier};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Command {
    let argv = std::iter::once("bw-preflight").chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap().into_command()
}

#[test]
fn test_default_command_is_check() {
    match parse(&[]) {
        Command::Check(args) => {
            assert_eq!(args.project, PathBuf::from("."));
            assert!(args.tier.is_empty());
            assert_eq!(args.format, OutputFormat::Text);
            assert!(!args.quiet);
            assert!(!args.verbose);
            assert!(!args.parallel);
            assert!(!args.fail_fast);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_project_without_subcommand() {
    match parse(&["OrderService.module", "--tier", "it", "--quiet"]) {
        Command::Check(args) => {
            assert_eq!(args.project, PathBuf::from("OrderService.module"));
            assert_eq!(args.tier, vec![Tier::It]);
            assert!(args.quiet);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_explicit_check_command() {
    match parse(&[
        "check",
        "App.module",
        "--tier",
        "IT",
        "--tier",
        "uat",
        "--baseline",
        "IT=/gv/it.substvar",
        "--format",
        "junit",
        "--parallel",
        "--max-parallel",
        "2",
        "--fail-fast",
    ]) {
        Command::Check(args) => {
            assert_eq!(args.tier, vec![Tier::It, Tier::Uat]);
            assert_eq!(args.baseline.len(), 1);
            assert_eq!(args.baseline[0].tier, Tier::It);
            assert_eq!(args.format, OutputFormat::Junit);
            assert!(args.parallel);
            assert_eq!(args.max_parallel, Some(2));
            assert!(args.fail_fast);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_list_and_version_commands() {
    assert!(matches!(parse(&["list"]), Command::List));
    assert!(matches!(parse(&["version"]), Command::Version));
}

#[test]
fn test_parse_command() {
    match parse(&["parse", "META-INF/IT.substvar", "--format", "json"]) {
        Command::Parse { file, format } => {
            assert_eq!(file, PathBuf::from("META-INF/IT.substvar"));
            assert_eq!(format, OutputFormat::Json);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_invalid_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["bw-preflight", "--tier", "PROD"]).is_err());
    assert!(Cli::try_parse_from(["bw-preflight", "--baseline", "no-equals-sign"]).is_err());
    assert!(Cli::try_parse_from(["bw-preflight", "--format", "xml"]).is_err());
    assert!(Cli::try_parse_from(["bw-preflight", "--max-parallel", "many"]).is_err());
}

fn check_args(args: &[&str]) -> bw_preflight::cli::args::CheckArgs {
    match parse(args) {
        Command::Check(args) => args,
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_cli_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bw-preflight.toml");
    fs::write(
        &config_path,
        r#"
        baseline_dir = "/from/file"
        max_parallel = 8

        [tiers.IT]
        baseline = "/file/it.substvar"
        "#,
    )
    .unwrap();

    let args = check_args(&[
        "--config",
        config_path.to_str().unwrap(),
        "--baseline",
        "IT=/cli/it.substvar",
        "--max-parallel",
        "2",
        "--parallel",
    ]);
    let config = PreflightConfig::from_args(&args).unwrap();

    assert_eq!(config.baseline_dir, Some(PathBuf::from("/from/file")));
    assert_eq!(config.max_parallel, 2);
    assert!(config.parallel);

    let profiles = config.tier_profiles().unwrap();
    let it = profiles.iter().find(|p| p.tier == Tier::It).unwrap();
    assert_eq!(it.baseline, PathBuf::from("/cli/it.substvar"));
    let pt = profiles.iter().find(|p| p.tier == Tier::Pt).unwrap();
    assert_eq!(pt.baseline, PathBuf::from("/from/file/predefined_PT.substvar"));
}

#[test]
fn test_requested_tier_without_baseline_is_config_error() {
    let args = check_args(&["--tier", "ST", "--baseline", "IT=/gv/it.substvar"]);
    let config = PreflightConfig::from_args(&args).unwrap();
    assert!(matches!(
        config.tier_profiles(),
        Err(ConfigError::MissingBaseline(Tier::St))
    ));
}

#[test]
fn test_missing_config_file_is_error() {
    let args = check_args(&["--config", "/definitely/not/here.toml"]);
    assert!(matches!(
        PreflightConfig::from_args(&args),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_no_baselines_at_all_is_config_error() {
    let config = PreflightConfig::from_args(&check_args(&[])).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::NoTiers)));
}
