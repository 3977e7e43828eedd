//! Identity-aware checks for connection credentials.
//!
//! A connection logs in either as the primary service account or as the
//! read-only alternate identity (`omselect`). The expected schema and
//! password depend on which one USER names:
//!
//! | USER            | expected SCHEMA_NAME       | expected PASSWORD              |
//! |-----------------|----------------------------|--------------------------------|
//! | `omselect`      | `omselect`                 | baseline `PASSWORD_omselect`   |
//! | anything else   | baseline `SCHEMA_NAME`     | baseline `PASSWORD`            |

use crate::project::substvar::VariableMap;
use crate::{Finding, Tier};
use std::collections::BTreeSet;
use tracing::debug;

/// Connection path shared by the credential variables
pub const DEFAULT_CONNECTION_PREFIX: &str = "//common-om-connections///Connections/JDBC/Postgres_Appl/";

/// Read-only alias with its own schema and password
pub const DEFAULT_ALTERNATE_IDENTITY: &str = "omselect";

/// Fully-qualified names of the credential variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeySet {
    pub user: String,
    pub schema_name: String,
    pub password: String,
    /// Baseline key holding the alternate identity's password
    pub alternate_password: String,
    pub alternate_identity: String,
}

impl CredentialKeySet {
    pub fn new(prefix: &str, alternate_identity: &str) -> Self {
        CredentialKeySet {
            user: format!("{}USER", prefix),
            schema_name: format!("{}SCHEMA_NAME", prefix),
            password: format!("{}PASSWORD", prefix),
            alternate_password: format!("{}PASSWORD_{}", prefix, alternate_identity),
            alternate_identity: alternate_identity.to_string(),
        }
    }

    /// Keys excluded from the plain variable comparison
    pub fn exclusions(&self) -> BTreeSet<String> {
        [
            &self.user,
            &self.schema_name,
            &self.password,
            &self.alternate_password,
        ]
        .into_iter()
        .cloned()
        .collect()
    }

    fn is_alternate(&self, user: &str) -> bool {
        user.eq_ignore_ascii_case(&self.alternate_identity)
    }
}

impl Default for CredentialKeySet {
    fn default() -> Self {
        CredentialKeySet::new(DEFAULT_CONNECTION_PREFIX, DEFAULT_ALTERNATE_IDENTITY)
    }
}

/// Check SCHEMA_NAME and PASSWORD of `tier_vars` against the identity in USER.
pub fn evaluate(
    tier: Tier,
    keys: &CredentialKeySet,
    tier_vars: &VariableMap,
    baseline: &VariableMap,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let user = tier_vars.get(&keys.user);
    let schema = tier_vars.get(&keys.schema_name);
    let password = tier_vars.get(&keys.password);

    let (Some(user), Some(schema)) = (user, schema) else {
        debug!(%tier, "USER or SCHEMA_NAME not set, skipping credential rule");
        return findings;
    };
    let alternate = keys.is_alternate(user);

    let expected_schema = if alternate {
        Some(keys.alternate_identity.as_str())
    } else {
        baseline.get(&keys.schema_name)
    };
    if let Some(expected) = expected_schema {
        if expected != schema {
            findings.push(Finding::schema_mismatch(tier, user, expected, schema));
        }
    }

    // Partial configuration is not a password defect.
    let Some(password) = password else {
        return findings;
    };

    let password_key = if alternate {
        &keys.alternate_password
    } else {
        &keys.password
    };
    // A baseline may deliberately leave secrets out.
    if let Some(expected) = baseline.get(password_key) {
        if expected != password {
            findings.push(Finding::password_mismatch(tier, user, expected, password));
        }
    }

    findings
}
