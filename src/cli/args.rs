//! Command line argument definitions using clap.
//!
//! Commands:
//! - bw-preflight [check] <PROJECT_DIR> [OPTIONS]
//! - bw-preflight list
//! - bw-preflight version
//! - bw-preflight parse <FILE>

use crate::Tier;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Environment variable consistency checks for TIBCO BusinessWorks projects
#[derive(Parser, Debug)]
#[command(name = "bw-preflight")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments of the default `check` command
    #[command(flatten)]
    pub check: CheckArgs,
}

impl Cli {
    /// The command to run; `check` when none was given
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Check(self.check))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the tier files of a project (default)
    Check(CheckArgs),

    /// List the rule of every tier
    List,

    /// Print version information
    Version,

    /// Print the variables of one substvar file
    Parse {
        /// Substvar file to parse
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

/// Baseline file for one tier, given as `TIER=PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineOverride {
    pub tier: Tier,
    pub path: PathBuf,
}

fn parse_baseline_override(s: &str) -> Result<BaselineOverride, String> {
    let (tier, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TIER=PATH, got '{}'", s))?;
    let tier = tier.parse::<Tier>().map_err(|e| e.to_string())?;
    if path.trim().is_empty() {
        return Err(format!("empty baseline path for tier {}", tier));
    }
    Ok(BaselineOverride {
        tier,
        path: PathBuf::from(path),
    })
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Project (module) directory to validate
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Validate only this tier (repeatable)
    #[arg(long = "tier", value_name = "TIER")]
    pub tier: Vec<Tier>,

    /// Baseline file for a tier (repeatable)
    #[arg(long, value_name = "TIER=PATH", value_parser = parse_baseline_override)]
    pub baseline: Vec<BaselineOverride>,

    /// Directory holding predefined_<TIER>.substvar baseline files
    #[arg(long, value_name = "DIR", env = "BW_PREFLIGHT_BASELINE_DIR")]
    pub baseline_dir: Option<PathBuf>,

    /// Load configuration from a TOML file
    #[arg(long, value_name = "FILE", env = "BW_PREFLIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "BW_PREFLIGHT_FORMAT")]
    pub format: OutputFormat,

    /// Only output tiers with findings
    #[arg(short, long)]
    pub quiet: bool,

    /// Include detailed diagnostic information and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Validate tiers in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Maximum number of tiers validated at once
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Stop after the first tier with an error
    #[arg(long)]
    pub fail_fast: bool,
}
