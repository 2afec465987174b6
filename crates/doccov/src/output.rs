//! Output formatting for coverage reports.

use doccov_core::CoverageReport;
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a coverage report in the specified format
pub fn render_report(report: &CoverageReport, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Text => render_text(report, verbose),
        OutputFormat::Json => render_json(report),
    }
}

/// Process exit code for a report: non-zero when overall coverage is below
/// the threshold or any scope violated its own.
pub fn exit_code(report: &CoverageReport, threshold: f64) -> u8 {
    let summary = &report.summary;
    if summary.coverage_percentage < threshold
        || !summary.scope_threshold_violations.is_empty()
    {
        1
    } else {
        0
    }
}

fn colored_percent(percent: f64) -> String {
    let text = format!("{percent:.1}%");
    if percent >= 80.0 {
        text.green().to_string()
    } else if percent >= 50.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

fn render_text(report: &CoverageReport, verbose: bool) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "{} Documentation Coverage Report\n\n",
        "##".bold()
    ));

    output.push_str(&format!(
        "Coverage: {} ({}/{} lines across {} files)\n",
        colored_percent(summary.coverage_percentage),
        summary.covered_lines,
        summary.total_lines,
        summary.total_files,
    ));
    output.push_str(&format!(
        "Functions: {} ({}/{})   Classes: {} ({}/{})\n\n",
        colored_percent(summary.functions_coverage_percentage),
        summary.functions_covered,
        summary.functions_total,
        colored_percent(summary.classes_coverage_percentage),
        summary.classes_covered,
        summary.classes_total,
    ));

    if !summary.scopes.is_empty() {
        output.push_str(&format!("{}\n", "Scopes:".bold()));
        for scope in &summary.scopes {
            let threshold_note = match scope.threshold {
                Some(t) => format!(" (threshold {t:.0}%)").dimmed().to_string(),
                None => String::new(),
            };
            output.push_str(&format!(
                "  {} {}{}\n",
                colored_percent(scope.coverage_percentage),
                scope.name,
                threshold_note,
            ));
        }
        output.push('\n');
    }

    if !summary.scope_threshold_violations.is_empty() {
        output.push_str(&format!(
            "{} Scope Threshold Violations ({}):\n",
            "!".red().bold(),
            summary.scope_threshold_violations.len()
        ));
        for v in &summary.scope_threshold_violations {
            output.push_str(&format!(
                "  {} {} at {:.1}%, needs {:.1}%\n",
                "-".red(),
                v.scope,
                v.actual,
                v.threshold
            ));
        }
        output.push('\n');
    }

    if !summary.undocumented_files.is_empty() {
        output.push_str(&format!(
            "{} Undocumented Files ({}):\n",
            "?".yellow().bold(),
            summary.undocumented_files.len()
        ));
        for path in &summary.undocumented_files {
            output.push_str(&format!("  {} {}\n", "-".yellow(), path.dimmed()));
        }
        output.push('\n');
    }

    if !report.recommendations.is_empty() {
        output.push_str(&format!("{}\n", "Recommendations:".bold()));
        for rec in &report.recommendations {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "*".cyan(),
                rec.file,
                rec.message.dimmed()
            ));
        }
        output.push('\n');
    }

    // Verbose: per-file breakdown with uncovered sections
    if verbose {
        output.push_str(&format!("{}\n", "Files:".bold()));
        for file in &report.files {
            output.push_str(&format!(
                "  {} {} ({}/{} lines)\n",
                colored_percent(file.coverage_percentage()),
                file.path,
                file.covered_lines,
                file.total_lines,
            ));
            for section in &file.uncovered_sections {
                output.push_str(&format!(
                    "      {} lines {}-{}\n",
                    "missing".dimmed(),
                    section.start,
                    section.end
                ));
            }
        }
        output.push('\n');
    }

    output
}

fn render_json(report: &CoverageReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        // A report is plain data; serialization only fails if something is
        // deeply wrong, and the renderer must still return text.
        format!("{{\"error\":\"failed to serialize report: {e}\"}}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccov_core::{CoverageAggregator, MemoryStore, ReportOptions};

    fn empty_report() -> CoverageReport {
        CoverageAggregator::new(MemoryStore::new())
            .generate_report(&ReportOptions {
                scan_filesystem: false,
                ..ReportOptions::default()
            })
            .unwrap()
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("yaml"), None);
    }

    #[test]
    fn test_exit_code_passing() {
        let report = empty_report();
        // Vacuous 100% clears the default threshold.
        assert_eq!(exit_code(&report, 80.0), 0);
    }

    #[test]
    fn test_exit_code_below_threshold() {
        let mut report = empty_report();
        report.summary.coverage_percentage = 42.0;
        assert_eq!(exit_code(&report, 80.0), 1);
    }

    #[test]
    fn test_exit_code_scope_violation() {
        let mut report = empty_report();
        report
            .summary
            .scope_threshold_violations
            .push(doccov_core::ScopeThresholdViolation {
                scope: "src".to_string(),
                actual: 10.0,
                threshold: 50.0,
            });
        assert_eq!(exit_code(&report, 80.0), 1);
    }

    #[test]
    fn test_json_rendering_is_valid_json() {
        let report = empty_report();
        let json = render_report(&report, OutputFormat::Json, false);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["coveragePercentage"], 100.0);
    }

    #[test]
    fn test_text_rendering_mentions_totals() {
        let report = empty_report();
        let text = render_report(&report, OutputFormat::Text, true);
        assert!(text.contains("Documentation Coverage Report"));
        assert!(text.contains("0/0 lines"));
    }
}
