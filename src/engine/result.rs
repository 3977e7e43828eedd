//! Result aggregation and reporting.
//!
//! Collects per-tier outcomes into a report and computes summaries.

use crate::{Finding, Severity, Tier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

/// Overall state of one tier after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierStatus {
    /// No findings
    Clean,
    /// Only warnings (tier file or baseline unavailable)
    Warn,
    /// At least one error finding
    Fail,
}

/// Findings produced by validating one tier.
#[derive(Debug, Clone, Serialize)]
pub struct TierOutcome {
    pub tier: Tier,
    pub rule_key: String,
    /// Resolved tier file, if one was found
    pub tier_file: Option<PathBuf>,
    pub findings: Vec<Finding>,
    pub duration_ms: u64,
}

impl TierOutcome {
    pub fn status(&self) -> TierStatus {
        match self.findings.iter().map(|f| f.severity).max() {
            Some(Severity::Error) => TierStatus::Fail,
            Some(Severity::Warning) => TierStatus::Warn,
            None => TierStatus::Clean,
        }
    }
}

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub clean: u32,
    pub warned: u32,
    pub failed: u32,
    pub total: u32,
    pub errors: u32,
    pub warnings: u32,
    pub total_duration_ms: u64,
}

impl ResultSummary {
    fn from_outcomes(outcomes: &[TierOutcome]) -> Self {
        let mut summary = ResultSummary::default();

        for outcome in outcomes {
            summary.total += 1;
            summary.total_duration_ms += outcome.duration_ms;

            match outcome.status() {
                TierStatus::Clean => summary.clean += 1,
                TierStatus::Warn => summary.warned += 1,
                TierStatus::Fail => summary.failed += 1,
            }

            for finding in &outcome.findings {
                match finding.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                }
            }
        }

        summary
    }

    /// Process exit code: 0 clean, 1 errors, 2 warnings only
    pub fn exit_code(&self) -> u8 {
        if self.errors > 0 {
            1
        } else if self.warnings > 0 {
            2
        } else {
            0
        }
    }
}

/// Validation report for one project
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub project: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub tiers: Vec<TierOutcome>,
    pub total_duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report
    pub fn new(project: impl Into<PathBuf>) -> Self {
        ValidationReport {
            project: project.into(),
            timestamp: Utc::now(),
            tiers: Vec::new(),
            total_duration_ms: 0,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_outcomes(&self.tiers)
    }

    /// All findings, grouped by tier
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.tiers.iter().flat_map(|t| t.findings.iter())
    }

    pub fn outcome(&self, tier: Tier) -> Option<&TierOutcome> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

/// Thread-safe collector for tier outcomes.
///
/// Tiers may finish on different worker threads; each outcome is appended
/// whole, so findings stay grouped by tier.
#[derive(Debug, Default)]
pub struct FindingSink {
    outcomes: Mutex<Vec<TierOutcome>>,
}

impl FindingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed tier outcome
    pub fn record(&self, outcome: TierOutcome) {
        // A poisoned lock still holds every outcome recorded so far.
        let mut outcomes = self.outcomes.lock().unwrap_or_else(|p| p.into_inner());
        outcomes.push(outcome);
    }

    /// Check if any recorded tier has an error finding
    pub fn has_failures(&self) -> bool {
        let outcomes = self.outcomes.lock().unwrap_or_else(|p| p.into_inner());
        outcomes.iter().any(|o| o.status() == TierStatus::Fail)
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create final validation report, tiers in DEV4..UAT order
    pub fn into_report(self, project: impl Into<PathBuf>, total_duration_ms: u64) -> ValidationReport {
        let mut tiers = self.outcomes.into_inner().unwrap_or_else(|p| p.into_inner());
        // Parallel runs finish in any order.
        tiers.sort_by_key(|t| t.tier);
        ValidationReport {
            tiers,
            total_duration_ms,
            ..ValidationReport::new(project)
        }
    }
}
