//! Output formatter integration tests.
//!
//! Runs real validations and checks each output format end to end.

use crate::mocks::MockWorkspace;
use bw_preflight::cli::args::OutputFormat;
use bw_preflight::cli::output::{format_variables, get_formatter, JsonFormatter, JunitFormatter, OutputFormatter, TerminalFormatter};
use bw_preflight::project::substvar;
use bw_preflight::{run_preflight, Report, Tier};

fn mixed_report() -> (MockWorkspace, Report) {
    let ws = MockWorkspace::new("Billing")
        .with_consistent_tier(Tier::Dev4, &[("A", "1")])
        .with_tier_file(Tier::It, &[("ENDPOINT", "http://localhost?a=1&b=2")])
        .with_baseline(Tier::It, &[("ENDPOINT", "https://it.billing/api")])
        .with_baseline(Tier::Pt, &[("A", "1")]);
    let report = run_preflight(&ws.project(), &ws.config_for(&[Tier::Dev4, Tier::It, Tier::Pt])).unwrap();
    (ws, report)
}

#[test]
fn test_terminal_report() {
    let (_ws, report) = mixed_report();
    let output = TerminalFormatter::new(false, false, false).format(&report);

    assert!(output.contains("bw-preflight substvar validation report"));
    assert!(output.contains("Billing.module"));
    assert!(output.contains("[PASS] DEV4"));
    assert!(output.contains("[FAIL] IT"));
    assert!(output.contains(
        "Variable 'ENDPOINT' mismatch. Expected: 'https://it.billing/api', Found: 'http://localhost?a=1&b=2' in IT.substvar"
    ));
    assert!(output.contains("[WARN] PT"));
    assert!(output.contains("Exit code: 1"));
}

#[test]
fn test_quiet_report_only_lists_problems() {
    let (_ws, report) = mixed_report();
    let output = TerminalFormatter::new(false, false, true).format(&report);
    assert!(!output.contains("DEV4"));
    assert!(output.contains("[FAIL] IT"));
    assert!(output.contains("[WARN] PT"));
}

#[test]
fn test_json_report_is_valid() {
    let (_ws, report) = mixed_report();
    let output = JsonFormatter::new(true).format(&report);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["summary"]["total"], 3);
    assert_eq!(value["summary"]["errors"], 1);
    assert_eq!(value["summary"]["warnings"], 1);
    assert_eq!(value["exit_code"], 1);

    let tiers = value["tiers"].as_array().unwrap();
    assert_eq!(tiers[0]["status"], "clean");
    assert_eq!(tiers[1]["rule_key"], "ITSubstvarValidation");
    assert_eq!(tiers[1]["findings"][0]["severity"], "error");
    assert_eq!(tiers[2]["findings"][0]["kind"], "missing_tier_file");
    assert!(value["timestamp"].as_str().unwrap().contains('T'));
}

#[test]
fn test_junit_report_escapes_values() {
    let (_ws, report) = mixed_report();
    let output = JunitFormatter::new().format(&report);

    assert!(output.contains("<testsuites tests=\"3\" failures=\"1\""));
    assert!(output.contains("classname=\"bw-preflight.IT\""));
    assert!(output.contains("a=1&amp;b=2"));
    assert!(!output.contains("a=1&b=2"));
    assert!(output.ends_with("</testsuites>"));
}

#[test]
fn test_get_formatter_selects_format() {
    let (_ws, report) = mixed_report();
    assert!(get_formatter(&OutputFormat::Json, false, false, false)
        .format(&report)
        .starts_with('{'));
    assert!(get_formatter(&OutputFormat::Junit, false, false, false)
        .format(&report)
        .starts_with("<?xml"));
    assert!(!get_formatter(&OutputFormat::Text, true, false, false)
        .format(&report)
        .contains("\x1b["));
}

#[test]
fn test_parse_output_keeps_document_order() {
    let ws = MockWorkspace::new("Billing").with_tier_file(Tier::St, &[("ZETA", "1"), ("ALPHA", "2")]);
    let path = ws.meta_inf().join("ST.substvar");
    let vars = substvar::parse_file(&path).unwrap();

    let output = format_variables(&path, &vars, &OutputFormat::Text);
    let zeta = output.find("ZETA").unwrap();
    let alpha = output.find("ALPHA").unwrap();
    assert!(zeta < alpha);
}
