//! Tier validation orchestrator.
//!
//! Runs the per-tier pipeline for every registered tier profile:
//! resolve tier file -> load baseline -> parse tier file -> diff -> credentials.
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Tier file not found: one warning finding, tier stops
//! - Invalid baseline path: one warning finding, tier stops
//! - Unparsable tier or baseline file: one error finding per file, tier stops
//! - Panic while validating a tier: caught via std::panic::catch_unwind,
//!   converted to an error finding for that tier
//!
//! A failing tier never prevents the other tiers from running unless
//! fail_fast is enabled.

use crate::checks::tier::TierProfile;
use crate::checks::{credentials, diff};
use crate::engine::result::{FindingSink, TierOutcome, ValidationReport};
use crate::project::baseline::{self, BaselineError};
use crate::project::{layout, substvar};
use crate::{Finding, Tier};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Validate tiers on worker threads
    pub parallel: bool,
    /// Stop after the first tier with an error finding
    pub fail_fast: bool,
    pub max_parallel: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            parallel: false,
            fail_fast: false,
            max_parallel: 4,
        }
    }
}

/// Tier validation orchestrator
pub struct ValidationOrchestrator {
    config: OrchestratorConfig,
    profiles: Vec<TierProfile>,
}

impl ValidationOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        ValidationOrchestrator {
            config,
            profiles: Vec::new(),
        }
    }

    /// Register tier profiles for execution
    pub fn register_tiers(&mut self, profiles: Vec<TierProfile>) {
        self.profiles.extend(profiles);
    }

    /// Register a single tier profile
    pub fn register_tier(&mut self, profile: TierProfile) {
        self.profiles.push(profile);
    }

    pub fn profiles(&self) -> &[TierProfile] {
        &self.profiles
    }

    /// Validate every registered tier
    pub fn run_all(&self, project_dir: &Path) -> ValidationReport {
        self.run(project_dir, self.profiles.iter().collect())
    }

    /// Validate only the given tiers (unregistered tiers are ignored)
    pub fn run_tiers(&self, project_dir: &Path, tiers: &[Tier]) -> ValidationReport {
        let selected = self
            .profiles
            .iter()
            .filter(|p| tiers.contains(&p.tier))
            .collect();
        self.run(project_dir, selected)
    }

    fn run(&self, project_dir: &Path, profiles: Vec<&TierProfile>) -> ValidationReport {
        let start = Instant::now();
        let sink = FindingSink::new();

        if self.config.parallel {
            self.run_parallel(project_dir, &profiles, &sink);
        } else {
            self.run_sequential(project_dir, &profiles, &sink);
        }

        let total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            project = %project_dir.display(),
            tiers = sink.len(),
            duration_ms = total_duration_ms,
            "validation finished"
        );
        sink.into_report(project_dir, total_duration_ms)
    }

    /// Run tiers one after another, in registration order
    fn run_sequential(&self, project_dir: &Path, profiles: &[&TierProfile], sink: &FindingSink) {
        for profile in profiles {
            sink.record(execute_tier(project_dir, profile));

            if self.config.fail_fast && sink.has_failures() {
                debug!(tier = %profile.tier, "fail-fast: stopping after failed tier");
                break;
            }
        }
    }

    /// Run tiers on scoped threads, at most max_parallel at a time
    fn run_parallel(&self, project_dir: &Path, profiles: &[&TierProfile], sink: &FindingSink) {
        let batch_size = self.config.max_parallel.max(1);

        for batch in profiles.chunks(batch_size) {
            std::thread::scope(|s| {
                for profile in batch {
                    s.spawn(move || sink.record(execute_tier(project_dir, profile)));
                }
            });

            if self.config.fail_fast && sink.has_failures() {
                debug!("fail-fast: stopping after failed batch");
                break;
            }
        }
    }
}

/// Validate one tier, converting a panic into a finding.
fn execute_tier(project_dir: &Path, profile: &TierProfile) -> TierOutcome {
    let start = Instant::now();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        validate_tier(project_dir, profile)
    }));

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(tier = %profile.tier, "tier validation panicked");
            TierOutcome {
                tier: profile.tier,
                rule_key: profile.rule().key,
                tier_file: None,
                findings: vec![Finding::internal(profile.tier)],
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}

/// Run the full pipeline for one tier of a project.
pub fn validate_tier(project_dir: &Path, profile: &TierProfile) -> TierOutcome {
    let start = Instant::now();
    let tier = profile.tier;
    let mut outcome = TierOutcome {
        tier,
        rule_key: profile.rule().key,
        tier_file: None,
        findings: Vec::new(),
        duration_ms: 0,
    };

    outcome.findings = match layout::resolve_tier_file(project_dir, &profile.file_name()) {
        Ok(tier_file) => {
            let findings = compare_tier_file(&tier_file, profile);
            outcome.tier_file = Some(tier_file);
            findings
        }
        Err(e) => {
            debug!(%tier, reason = %e, "tier file not found");
            vec![Finding::missing_tier_file(tier)]
        }
    };
    outcome.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        %tier,
        findings = outcome.findings.len(),
        status = ?outcome.status(),
        "tier validated"
    );
    outcome
}

fn compare_tier_file(tier_file: &Path, profile: &TierProfile) -> Vec<Finding> {
    let tier = profile.tier;

    let baseline = baseline::load_baseline(&profile.baseline);
    if baseline.as_ref().is_err_and(BaselineError::is_invalid_path) {
        return vec![Finding::invalid_baseline(tier, &profile.baseline)];
    }
    let tier_vars = substvar::parse_file(tier_file);

    let (tier_vars, baseline) = match (tier_vars, baseline) {
        (Ok(tier_vars), Ok(baseline)) => (tier_vars, baseline),
        (tier_vars, baseline) => {
            let mut findings = Vec::new();
            if let Err(e) = tier_vars {
                warn!(%tier, error = %e, "cannot parse tier file");
                findings.push(Finding::parse_error(tier, &e));
            }
            if let Err(BaselineError::Parse(e)) = baseline {
                warn!(%tier, error = %e, "cannot parse baseline file");
                findings.push(Finding::parse_error(tier, &e));
            }
            return findings;
        }
    };

    debug!(
        %tier,
        tier_variables = tier_vars.len(),
        baseline_variables = baseline.len(),
        credential_rule = profile.credential_rule,
        "comparing against baseline"
    );

    let mut findings = diff::diff(tier, &tier_vars, &baseline, &profile.exclusions());
    if profile.credential_rule {
        findings.extend(credentials::evaluate(
            tier,
            &profile.credentials,
            &tier_vars,
            &baseline,
        ));
    }
    findings
}
