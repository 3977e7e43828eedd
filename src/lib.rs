//! bw-preflight library
//!
//! Environment variable consistency checks for TIBCO BusinessWorks projects.
//!
//! Every deployment tier (DEV4, IT, PT, ST, UAT) ships a `<TIER>.substvar`
//! file inside the application module's `META-INF` folder. This library
//! locates those files, parses their global variables and compares them
//! against a tier-specific baseline ("predefined") file:
//! - Variables declared by the baseline must carry the baseline's value
//! - Connection credentials (USER, SCHEMA_NAME, PASSWORD) are checked against
//!   the identity configured in USER, including the read-only `omselect` alias
//! - Missing tier files, invalid baselines and unparsable markup are reported
//!   as findings rather than aborting the run
//!
//! # Example
//!
//! ```no_run
//! use bw_preflight::{run_preflight, PreflightConfig, Tier};
//! use std::path::Path;
//!
//! let mut config = PreflightConfig::default();
//! config.set_baseline(Tier::It, "/srv/gv/predefined_IT.substvar");
//! let report = run_preflight(Path::new("MyApp.module"), &config).expect("invalid configuration");
//! println!("Tiers failed: {}", report.summary().failed);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod project;
pub mod version;

use engine::orchestrator::{OrchestratorConfig, ValidationOrchestrator};
use engine::result::ValidationReport;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

// Re-exports for public API
pub use config::{ConfigError, PreflightConfig};
pub use engine::result::{ResultSummary, ValidationReport as Report};
pub use project::substvar::{ParseError, VariableMap};

/// Deployment tier owning a `<TIER>.substvar` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Dev4,
    It,
    Pt,
    St,
    Uat,
}

impl Tier {
    /// All tiers in validation order
    pub const ALL: [Tier; 5] = [Tier::Dev4, Tier::It, Tier::Pt, Tier::St, Tier::Uat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Dev4 => "DEV4",
            Tier::It => "IT",
            Tier::Pt => "PT",
            Tier::St => "ST",
            Tier::Uat => "UAT",
        }
    }

    /// Name of the tier file inside `META-INF`, e.g. `IT.substvar`
    pub fn file_name(&self) -> String {
        format!("{}.substvar", self.as_str())
    }

    /// Conventional baseline file name, e.g. `predefined_IT.substvar`
    pub fn baseline_file_name(&self) -> String {
        format!("predefined_{}.substvar", self.as_str())
    }

    /// Whether the credential rule applies unless configured otherwise.
    ///
    /// DEV4 only runs the plain variable comparison.
    pub fn default_credential_rule(&self) -> bool {
        !matches!(self, Tier::Dev4)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tier '{0}' (expected one of DEV4, IT, PT, ST, UAT)")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory: the tier could not be validated
    Warning,
    /// Configuration defect or unreadable markup
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingTierFile,
    InvalidBaseline,
    ParseError,
    VariableMismatch,
    SchemaMismatch,
    PasswordMismatch,
    /// Validation of the tier panicked
    Internal,
}

/// A single file-level issue reported for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub tier: Tier,
    pub message: String,
}

impl Finding {
    pub fn missing_tier_file(tier: Tier) -> Self {
        Finding {
            severity: Severity::Warning,
            kind: FindingKind::MissingTierFile,
            tier,
            message: format!("Missing {} in application folder", tier.file_name()),
        }
    }

    pub fn invalid_baseline(tier: Tier, path: &Path) -> Self {
        Finding {
            severity: Severity::Warning,
            kind: FindingKind::InvalidBaseline,
            tier,
            message: format!(
                "Invalid {} file: {}",
                tier.baseline_file_name(),
                path.display()
            ),
        }
    }

    pub fn parse_error(tier: Tier, error: &ParseError) -> Self {
        Finding {
            severity: Severity::Error,
            kind: FindingKind::ParseError,
            tier,
            message: format!("Error parsing: {} - {}", error.file, error.cause),
        }
    }

    pub fn variable_mismatch(tier: Tier, name: &str, expected: &str, found: &str) -> Self {
        Finding {
            severity: Severity::Error,
            kind: FindingKind::VariableMismatch,
            tier,
            message: format!(
                "Variable '{}' mismatch. Expected: '{}', Found: '{}' in {}",
                name,
                expected,
                found,
                tier.file_name()
            ),
        }
    }

    pub fn schema_mismatch(tier: Tier, user: &str, expected: &str, found: &str) -> Self {
        Finding {
            severity: Severity::Error,
            kind: FindingKind::SchemaMismatch,
            tier,
            message: format!(
                "SCHEMA NAME mismatch for USER '{}'. Expected: '{}', Found: '{}' in {}",
                user,
                expected,
                found,
                tier.file_name()
            ),
        }
    }

    pub fn password_mismatch(tier: Tier, user: &str, expected: &str, found: &str) -> Self {
        Finding {
            severity: Severity::Error,
            kind: FindingKind::PasswordMismatch,
            tier,
            message: format!(
                "Password mismatch for USER '{}'. Expected: '{}', Found: '{}' in {}",
                user,
                expected,
                found,
                tier.file_name()
            ),
        }
    }

    pub fn internal(tier: Tier) -> Self {
        Finding {
            severity: Severity::Error,
            kind: FindingKind::Internal,
            tier,
            message: format!("Validation of {} aborted unexpectedly", tier.file_name()),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.tier, self.message)
    }
}

/// Error types for bw-preflight operations.
///
/// Validation problems never show up here; they are reported as findings.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("project directory {} does not exist or is not a directory", .path.display())]
    InvalidProject { path: PathBuf },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Validate a project against every tier enabled in `config`.
///
/// The configuration is validated first; an invalid configuration is the only
/// way this function fails once the project directory exists.
pub fn run_preflight(
    project_dir: &Path,
    config: &PreflightConfig,
) -> Result<ValidationReport, PreflightError> {
    let invalid = || PreflightError::InvalidProject {
        path: project_dir.to_path_buf(),
    };
    if !project_dir.is_dir() {
        return Err(invalid());
    }
    // Siblings are looked up next to the resolved directory, so `.` works.
    let project_dir = std::fs::canonicalize(project_dir).map_err(|_| invalid())?;

    let profiles = config.tier_profiles()?;
    info!(
        project = %project_dir.display(),
        tiers = profiles.len(),
        "starting substvar validation"
    );

    let mut orchestrator = ValidationOrchestrator::new(OrchestratorConfig {
        parallel: config.parallel,
        fail_fast: config.fail_fast,
        max_parallel: config.max_parallel,
    });
    orchestrator.register_tiers(profiles);

    Ok(orchestrator.run_all(&project_dir))
}
