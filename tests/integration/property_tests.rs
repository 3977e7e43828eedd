//! Property tests for parsing and comparison.

use crate::mocks::substvar_xml;
use bw_preflight::checks::diff::diff;
use bw_preflight::project::substvar::parse_str;
use bw_preflight::{Tier, VariableMap};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn variables() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[A-Za-z_][A-Za-z0-9_/]{0,16}", "[A-Za-z0-9&<>'\" .:/=-]{0,16}", 0..12)
}

fn to_map(vars: &BTreeMap<String, String>) -> VariableMap {
    vars.iter().collect()
}

proptest! {
    #[test]
    fn parsed_keys_match_written_keys(vars in variables()) {
        let pairs: Vec<_> = vars.iter().collect();
        let parsed = parse_str("IT.substvar", &substvar_xml(&pairs)).unwrap();

        let keys: BTreeSet<&str> = parsed.keys().collect();
        let expected: BTreeSet<&str> = vars.keys().map(String::as_str).collect();
        prop_assert_eq!(keys, expected);
        for (name, value) in &vars {
            prop_assert_eq!(parsed.get(name), Some(value.trim()));
        }
    }

    #[test]
    fn a_map_never_differs_from_itself(vars in variables()) {
        let map = to_map(&vars);
        prop_assert!(diff(Tier::It, &map, &map, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn findings_only_name_keys_with_different_values(
        tier_vars in variables(),
        baseline_vars in variables(),
    ) {
        let findings = diff(Tier::St, &to_map(&tier_vars), &to_map(&baseline_vars), &BTreeSet::new());
        let differing = baseline_vars
            .iter()
            .filter(|(k, v)| tier_vars.get(*k).is_some_and(|t| t.trim() != v.trim()))
            .count();
        prop_assert_eq!(findings.len(), differing);
    }

    #[test]
    fn more_exclusions_never_add_findings(
        tier_vars in variables(),
        baseline_vars in variables(),
        excluded in prop::collection::btree_set("[A-Za-z_][A-Za-z0-9_/]{0,16}", 0..6),
    ) {
        let tier_map = to_map(&tier_vars);
        let baseline_map = to_map(&baseline_vars);

        let mut wider = excluded.clone();
        wider.extend(baseline_vars.keys().take(2).cloned());

        let narrow = diff(Tier::Uat, &tier_map, &baseline_map, &excluded);
        let wide = diff(Tier::Uat, &tier_map, &baseline_map, &wider);
        prop_assert!(wide.len() <= narrow.len());
        for finding in &wide {
            prop_assert!(narrow.contains(finding));
        }
    }
}
