//! Per-tier validation profiles and rule metadata.

use crate::checks::credentials::CredentialKeySet;
use crate::Tier;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Static description of the rule validating one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Rule key, e.g. `ITSubstvarValidation`
    pub key: String,
    pub name: String,
    pub description: String,
    pub priority: &'static str,
}

/// Rule metadata for a tier with its default credential rule.
pub fn rule_for(tier: Tier) -> RuleDescriptor {
    describe_rule(tier, tier.default_credential_rule())
}

fn describe_rule(tier: Tier, credential_rule: bool) -> RuleDescriptor {
    let file = tier.file_name();
    let baseline = tier.baseline_file_name();
    let mut description = format!(
        "Compares values of matching global variables between {} and {}",
        file, baseline
    );
    if credential_rule {
        description.push_str(" with omselect validation");
    }

    RuleDescriptor {
        key: format!("{}SubstvarValidation", tier.as_str()),
        name: format!("Validate {} Variable Values with {}", file, baseline),
        description,
        priority: "CRITICAL",
    }
}

/// Everything needed to validate one tier of a project.
#[derive(Debug, Clone)]
pub struct TierProfile {
    pub tier: Tier,
    /// Baseline ("predefined") file the tier file is compared against
    pub baseline: PathBuf,
    /// Run the identity-aware USER/SCHEMA_NAME/PASSWORD checks
    pub credential_rule: bool,
    pub credentials: CredentialKeySet,
    /// Replaces the default exclusion set when present
    pub exclusions_override: Option<BTreeSet<String>>,
}

impl TierProfile {
    pub fn new(tier: Tier, baseline: impl Into<PathBuf>) -> Self {
        TierProfile {
            tier,
            baseline: baseline.into(),
            credential_rule: tier.default_credential_rule(),
            credentials: CredentialKeySet::default(),
            exclusions_override: None,
        }
    }

    pub fn with_credential_rule(mut self, enabled: bool) -> Self {
        self.credential_rule = enabled;
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialKeySet) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions_override = Some(exclusions.into_iter().map(Into::into).collect());
        self
    }

    pub fn file_name(&self) -> String {
        self.tier.file_name()
    }

    pub fn rule(&self) -> RuleDescriptor {
        describe_rule(self.tier, self.credential_rule)
    }

    /// Keys left out of the plain comparison.
    ///
    /// Defaults to the credential keys when the credential rule runs, and to
    /// nothing otherwise.
    pub fn exclusions(&self) -> BTreeSet<String> {
        match &self.exclusions_override {
            Some(keys) => keys.clone(),
            None if self.credential_rule => self.credentials.exclusions(),
            None => BTreeSet::new(),
        }
    }
}
