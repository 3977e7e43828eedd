//! Output formatting for bw-preflight.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! # Graceful Degradation
//!
//! - Non-TTY output: color disabled via NO_COLOR or --no-color
//! - Empty reports: valid output with zero tiers
//! - Serialization failures: reported inside the output instead of panicking
//!
//! All formatters produce valid output for any ValidationReport input.

use crate::cli::args::OutputFormat;
use crate::engine::result::{TierOutcome, TierStatus, ValidationReport};
use crate::project::substvar::VariableMap;
use crate::{Finding, ResultSummary, Severity};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use serde::Serialize;
use std::path::Path;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn yellow(&self, text: &str) -> String {
        self.colorize(text, "33")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn gray(&self, text: &str) -> String {
        self.colorize(text, "90")
    }

    fn status_label(&self, status: TierStatus) -> String {
        match status {
            TierStatus::Clean => self.green("[PASS]"),
            TierStatus::Warn => self.yellow("[WARN]"),
            TierStatus::Fail => self.red("[FAIL]"),
        }
    }

    fn write_tier(&self, output: &mut String, outcome: &TierOutcome) {
        let status = outcome.status();
        let headline = match status {
            TierStatus::Clean => "all variables match".to_string(),
            _ => format!("{} finding(s)", outcome.findings.len()),
        };

        output.push_str(&format!(
            "  {} {} {}: {}",
            self.status_label(status),
            outcome.tier,
            outcome.rule_key,
            headline
        ));
        if self.verbose {
            output.push_str(&self.gray(&format!(" ({}ms)", outcome.duration_ms)));
        }
        output.push('\n');

        if self.verbose {
            if let Some(ref file) = outcome.tier_file {
                output.push_str(&format!("         {}\n", self.gray(&file.display().to_string())));
            }
        }

        for finding in &outcome.findings {
            let marker = match finding.severity {
                Severity::Error => self.red("x"),
                Severity::Warning => self.yellow("!"),
            };
            output.push_str(&format!("         {} {}\n", marker, finding.message));
        }
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str("bw-preflight substvar validation report\n");
        output.push_str(&format!("Project: {}\n", report.project.display()));
        output.push_str(&format!("Timestamp: {}\n", format_timestamp(&report.timestamp)));
        output.push_str(RULE);
        output.push_str("\n\n");

        let shown: Vec<_> = report
            .tiers
            .iter()
            .filter(|t| !self.quiet || t.status() != TierStatus::Clean)
            .collect();

        if !shown.is_empty() {
            output.push_str("TIER CHECKS\n");
            for outcome in shown {
                self.write_tier(&mut output, outcome);
            }
            output.push('\n');
        }

        // Summary
        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} clean, {} warnings, {} failed ({} errors, {} warning findings)\n",
            summary.clean, summary.warned, summary.failed, summary.errors, summary.warnings
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));
        output.push_str(&format!(
            "Exit code: {} ({})\n",
            summary.exit_code(),
            exit_description(&summary)
        ));
        output.push_str(RULE);

        output
    }
}

fn exit_description(summary: &ResultSummary) -> &'static str {
    match summary.exit_code() {
        0 => "all tiers consistent",
        1 => "mismatches detected",
        _ => "warnings detected",
    }
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

#[derive(Serialize)]
struct JsonTier<'a> {
    status: TierStatus,
    #[serde(flatten)]
    outcome: &'a TierOutcome,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    project: &'a Path,
    timestamp: &'a DateTime<Utc>,
    total_duration_ms: u64,
    exit_code: u8,
    summary: ResultSummary,
    tiers: Vec<JsonTier<'a>>,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let summary = report.summary();
        let json = JsonReport {
            project: &report.project,
            timestamp: &report.timestamp,
            total_duration_ms: report.total_duration_ms,
            exit_code: summary.exit_code(),
            summary,
            tiers: report
                .tiers
                .iter()
                .map(|outcome| JsonTier {
                    status: outcome.status(),
                    outcome,
                })
                .collect(),
        };
        self.render(&json)
    }
}

/// JUnit XML formatter
///
/// One testsuite per report, one testcase per tier. Error findings become
/// `<failure>` elements; warnings go to `<system-out>`.
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn findings_text(findings: &[&Finding]) -> String {
        findings
            .iter()
            .map(|f| escape(f.message.as_str()).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        let time = report.total_duration_ms as f64 / 1000.0;
        output.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"0\" time=\"{:.3}\">\n",
            summary.total, summary.failed, time
        ));
        output.push_str(&format!(
            "  <testsuite name=\"substvar\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"0\" time=\"{:.3}\" timestamp=\"{}\">\n",
            summary.total,
            summary.failed,
            time,
            format_timestamp(&report.timestamp)
        ));

        for outcome in &report.tiers {
            output.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"bw-preflight.{}\" time=\"{:.3}\"",
                escape(outcome.rule_key.as_str()),
                outcome.tier,
                outcome.duration_ms as f64 / 1000.0
            ));

            let (errors, warnings): (Vec<&Finding>, Vec<&Finding>) = outcome
                .findings
                .iter()
                .partition(|f| f.severity == Severity::Error);

            if errors.is_empty() && warnings.is_empty() {
                output.push_str(" />\n");
                continue;
            }

            output.push_str(">\n");
            if !errors.is_empty() {
                output.push_str(&format!(
                    "      <failure message=\"{} error finding(s) in {}\">{}</failure>\n",
                    errors.len(),
                    outcome.tier.file_name(),
                    Self::findings_text(&errors)
                ));
            }
            if !warnings.is_empty() {
                output.push_str(&format!(
                    "      <system-out>WARNING: {}</system-out>\n",
                    Self::findings_text(&warnings)
                ));
            }
            output.push_str("    </testcase>\n");
        }

        output.push_str("  </testsuite>\n");
        output.push_str("</testsuites>");
        output
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(
    format: &OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(!no_color, verbose, quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
    }
}

/// Render the variables of one parsed file (`parse` command).
///
/// JUnit has no meaning here and falls back to text.
pub fn format_variables(file: &Path, vars: &VariableMap, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => JsonFormatter::new(true).render(vars),
        OutputFormat::Text | OutputFormat::Junit => {
            let mut output = format!("{} ({} variables)\n", file.display(), vars.len());
            let width = vars.keys().map(str::len).max().unwrap_or(0);
            for (name, value) in vars.iter() {
                output.push_str(&format!("  {:width$} = {}\n", name, value, width = width));
            }
            output
        }
    }
}

/// Format a timestamp as ISO 8601 with second precision
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
