//! bw-preflight CLI entry point
//!
//! Environment variable consistency checks for TIBCO BusinessWorks projects.

use bw_preflight::checks::all_rules;
use bw_preflight::cli::args::{CheckArgs, Cli, Command, OutputFormat};
use bw_preflight::cli::output::{format_variables, get_formatter};
use bw_preflight::project::substvar;
use bw_preflight::version::get_build_info;
use bw_preflight::{run_preflight, PreflightConfig, PreflightError};

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit code for configuration and runtime errors
const EXIT_RUNTIME_ERROR: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.into_command();

    let verbose = matches!(&command, Command::Check(args) if args.verbose);
    init_tracing(verbose);

    let result = match command {
        Command::Version => {
            println!("{}", get_build_info());
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            print_rule_list();
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse { file, format } => parse_file(&file, &format),
        Command::Check(args) => run_checks(&args),
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_RUNTIME_ERROR)
    })
}

/// Logs go to stderr so report output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn print_rule_list() {
    println!("Available rules:");
    println!();
    for rule in all_rules() {
        println!("  {:24} {}", rule.key, rule.name);
        println!("  {:24} {} [{}]", "", rule.description, rule.priority);
    }
}

fn parse_file(file: &Path, format: &OutputFormat) -> Result<ExitCode, PreflightError> {
    let vars = substvar::parse_file(file)?;
    println!("{}", format_variables(file, &vars, format));
    Ok(ExitCode::SUCCESS)
}

fn run_checks(args: &CheckArgs) -> Result<ExitCode, PreflightError> {
    let config = PreflightConfig::from_args(args)?;
    let report = run_preflight(&args.project, &config)?;

    // NO_COLOR is honored even without --no-color
    let no_color = args.no_color || std::env::var_os("NO_COLOR").is_some();
    let formatter = get_formatter(&args.format, no_color, args.verbose, args.quiet);
    println!("{}", formatter.format(&report));

    Ok(ExitCode::from(report.summary().exit_code()))
}
