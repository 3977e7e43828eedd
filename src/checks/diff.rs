//! Baseline comparison of global variables.

use crate::project::substvar::VariableMap;
use crate::{Finding, Tier};
use std::collections::BTreeSet;

/// Compare `tier_vars` against `baseline`, one direction only.
///
/// Every baseline variable that is also declared by the tier file must carry
/// the same value. Baseline variables missing from the tier file and tier
/// variables unknown to the baseline are not reported. Keys in `exclusions`
/// are skipped.
pub fn diff(
    tier: Tier,
    tier_vars: &VariableMap,
    baseline: &VariableMap,
    exclusions: &BTreeSet<String>,
) -> Vec<Finding> {
    baseline
        .iter()
        .filter(|(name, _)| !exclusions.contains(*name))
        .filter_map(|(name, expected)| {
            let actual = tier_vars.get(name)?;
            (actual != expected).then(|| Finding::variable_mismatch(tier, name, expected, actual))
        })
        .collect()
}
