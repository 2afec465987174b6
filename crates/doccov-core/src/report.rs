//! Coverage report data model.
//!
//! Everything here is a value object created and discarded within one
//! [`generate_report`](crate::CoverageAggregator::generate_report) call. The
//! serialized shape (camelCase field names, RFC 3339 timestamp) is the wire
//! contract consumed by external renderers, so the serde renames are part of
//! the interface, not cosmetics.

use crate::interval::Span;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a single extracted symbol falls inside any documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolCoverage {
    pub name: String,
    pub span: Span,
    pub is_covered: bool,
}

/// Line- and symbol-level coverage for one file.
///
/// Invariants: `covered_lines` equals the summed length of
/// `covered_sections`, and when `total_lines > 0` the covered and uncovered
/// sections partition `[1, total_lines]` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    pub path: String,
    pub total_lines: usize,
    pub covered_lines: usize,
    pub covered_sections: Vec<Span>,
    pub uncovered_sections: Vec<Span>,
    pub functions: Vec<SymbolCoverage>,
    pub classes: Vec<SymbolCoverage>,
}

impl FileCoverage {
    /// Coverage percentage for this file (vacuous 100 when it has no lines).
    pub fn coverage_percentage(&self) -> f64 {
        percentage(self.covered_lines, self.total_lines)
    }
}

/// Aggregated coverage for one named scope (e.g. a top-level directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub name: String,
    pub total_lines: usize,
    pub covered_lines: usize,
    pub coverage_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// A scope whose coverage fell below its configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeThresholdViolation {
    pub scope: String,
    pub actual: f64,
    pub threshold: f64,
}

/// Project-wide rollup of the per-file results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_files: usize,
    pub total_lines: usize,
    pub covered_lines: usize,
    pub coverage_percentage: f64,
    /// Files at exactly 0% coverage.
    pub undocumented_files: Vec<String>,
    /// Files above 0% but below the overall threshold.
    pub low_coverage_files: Vec<String>,
    pub functions_total: usize,
    pub functions_covered: usize,
    pub classes_total: usize,
    pub classes_covered: usize,
    pub functions_coverage_percentage: f64,
    pub classes_coverage_percentage: f64,
    pub scopes: Vec<ScopeSummary>,
    pub scope_threshold_violations: Vec<ScopeThresholdViolation>,
}

/// A deterministic follow-up suggestion for a low-coverage file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub file: String,
    pub message: String,
    pub priority: String,
}

/// The sole output of one report generation; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub summary: CoverageSummary,
    pub files: Vec<FileCoverage>,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

/// The vacuous-100 percentage convention, applied at every aggregation level:
/// a denominator of zero yields 100, not 0 and not NaN.
pub fn percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (covered as f64 / total as f64) * 100.0
}

/// Symbol-level percentage with the asymmetric zero-symbol rule: when no
/// symbols exist, the result is 0 if nothing at all is documented and 100
/// otherwise. This distinguishes "nothing is documented, so nothing was even
/// found" from "an otherwise-documented project just has no functions".
pub fn symbol_percentage(covered: usize, total: usize, covered_lines: usize) -> f64 {
    if total == 0 {
        return if covered_lines == 0 { 0.0 } else { 100.0 };
    }
    (covered as f64 / total as f64) * 100.0
}
