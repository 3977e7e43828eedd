//! Variable consistency checks.
//!
//! - `tier`: per-tier profiles (baseline, credential rule, exclusions) and
//!   rule metadata
//! - `diff`: plain baseline comparison
//! - `credentials`: USER/SCHEMA_NAME/PASSWORD rules for the service identity
//!
//! # Graceful Degradation
//!
//! Checks only ever see parsed `VariableMap`s. Missing files, invalid
//! baselines and malformed markup are turned into findings before a check
//! runs, so checks never fail and never panic.

pub mod credentials;
pub mod diff;
pub mod tier;

pub use credentials::CredentialKeySet;
pub use tier::{rule_for, RuleDescriptor, TierProfile};

use crate::Tier;

/// Rule metadata for every tier, in validation order
pub fn all_rules() -> Vec<RuleDescriptor> {
    Tier::ALL.into_iter().map(rule_for).collect()
}
