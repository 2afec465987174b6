//! Coverage aggregation: the one-pass orchestrator behind `generate_report`.
//!
//! The pass composes the other modules in a fixed order: build the coverage
//! map from the documentation store, discover files on disk, union the two
//! file sets, then analyze every file in the union and roll the results up
//! into a [`CoverageReport`].
//!
//! The union is the load-bearing correctness property: a file that exists on
//! disk but is named by no documentation still gets counted (at 0%), instead
//! of the naive bug of only ever inspecting documented files.
//!
//! Failure philosophy: option validation fails fast before any I/O; every
//! error after that point is absorbed where it occurs (skip the entry, drop
//! to a smaller file set, or degrade to the vacuous-empty report) so the
//! returned report is always structurally valid.

use crate::error::{Error, Result};
use crate::interval::{self, Span};
use crate::reference::parse_source_reference;
use crate::report::{
    percentage, symbol_percentage, CoverageReport, CoverageSummary, FileCoverage, Recommendation,
    ScopeSummary, ScopeThresholdViolation, SymbolCoverage,
};
use crate::store::DocumentationStore;
use crate::symbols::{self, SymbolKind};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(feature = "walk")]
use crate::discovery::{self, DiscoveryOptions};

/// Overall coverage threshold applied when the caller supplies none.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// The fixed, content-unaware recommendation attached to low-coverage files.
const RECOMMENDATION_MESSAGE: &str = "add documentation sources covering uncovered sections";

/// Options for one report generation.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Include glob patterns, relative to `root_dir`.
    pub include: Vec<String>,
    /// Exclude glob patterns, applied as an ignore list.
    pub exclude: Vec<String>,
    pub root_dir: PathBuf,
    /// Overall threshold in `[0, 100]`; files under it (but above 0%) are
    /// classified as low-coverage.
    pub threshold: f64,
    /// Per-scope thresholds; when non-empty, the keys define the scopes.
    pub scope_thresholds: BTreeMap<String, f64>,
    /// When false, only files named by documentation are analyzed.
    pub scan_filesystem: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include: vec!["src/**/*.ts".to_string(), "src/**/*.js".to_string()],
            exclude: vec!["node_modules/**".to_string(), "dist/**".to_string()],
            root_dir: PathBuf::from("."),
            threshold: DEFAULT_THRESHOLD,
            scope_thresholds: BTreeMap::new(),
            scan_filesystem: true,
        }
    }
}

/// Progress callback invoked after each file's analysis.
///
/// Contract: the engine calls `file_analyzed` with a monotonically increasing
/// `(processed, total)` pair, `1 <= processed <= total`. Implementations must
/// not panic; a panic is caught and discarded without affecting the report,
/// so a broken observer can only lose its own notifications.
pub trait ProgressObserver {
    fn file_analyzed(&self, processed: usize, total: usize, path: &str);
}

/// The merged documentation claims for one file.
#[derive(Debug, Default)]
struct FileRefs {
    /// Some reference claimed the whole file; wins over any partial ranges.
    full_file: bool,
    ranges: Vec<Span>,
}

/// Call-scoped working state for one report pass. Deliberately not a field of
/// the aggregator: repeated or concurrent `generate_report` calls on one
/// value must not share line-count state.
#[derive(Default)]
struct ReportContext {
    line_counts: HashMap<PathBuf, usize>,
}

/// The coverage engine. Holds only the documentation store; all per-report
/// state lives in a [`ReportContext`] created per call.
pub struct CoverageAggregator<S> {
    store: S,
}

impl<S: DocumentationStore> CoverageAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Generate a coverage report. The sole entry point.
    ///
    /// Returns `Err` only for unusable options (empty include list, threshold
    /// outside `[0, 100]`, malformed glob), raised before any I/O.
    pub fn generate_report(&self, options: &ReportOptions) -> Result<CoverageReport> {
        self.generate_report_with_observer(options, None)
    }

    /// Like [`generate_report`](Self::generate_report), with per-file
    /// progress notifications.
    pub fn generate_report_with_observer(
        &self,
        options: &ReportOptions,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<CoverageReport> {
        validate_options(options)?;

        let mut ctx = ReportContext::default();

        let coverage_map = match self.build_coverage_map() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "documentation store unreachable, reporting empty coverage");
                return Ok(empty_report());
            }
        };

        let discovered = self.discover(options);

        // Union of discovered and documented files, discovered order first.
        let mut seen: HashSet<String> = HashSet::new();
        let mut analysis_set: Vec<String> = Vec::new();
        for path in discovered {
            if seen.insert(path.clone()) {
                analysis_set.push(path);
            }
        }
        for path in coverage_map.keys() {
            if seen.insert(path.clone()) {
                analysis_set.push(path.clone());
            }
        }

        let total_count = analysis_set.len();
        let mut files = Vec::with_capacity(total_count);
        for (idx, rel) in analysis_set.iter().enumerate() {
            let file = analyze_file(&mut ctx, options, rel, coverage_map.get(rel));
            files.push(file);

            if let Some(obs) = observer {
                // Observer contract is no-panic; shield the pass anyway.
                let _ = catch_unwind(AssertUnwindSafe(|| {
                    obs.file_analyzed(idx + 1, total_count, rel);
                }));
            }
        }

        Ok(assemble_report(options, files))
    }

    /// Parse every reference owner's source strings into per-file claims.
    /// Individual bad entries are skipped and logged; only a store-level
    /// failure propagates (and the caller absorbs that too).
    fn build_coverage_map(&self) -> Result<BTreeMap<String, FileRefs>> {
        let owners = self.store.all_reference_owners()?;

        let mut map: BTreeMap<String, FileRefs> = BTreeMap::new();
        for owner in &owners {
            for raw in &owner.sources {
                match parse_source_reference(raw) {
                    Ok(reference) => {
                        let refs = map.entry(reference.file_path).or_default();
                        if reference.ranges.is_empty() {
                            refs.full_file = true;
                        } else {
                            refs.ranges.extend(reference.ranges);
                        }
                    }
                    Err(e) => {
                        warn!(
                            owner = %owner.id,
                            source = %raw,
                            error = %e,
                            "skipping unusable documentation reference"
                        );
                    }
                }
            }
        }
        Ok(map)
    }

    fn discover(&self, options: &ReportOptions) -> Vec<String> {
        if !options.scan_filesystem {
            return Vec::new();
        }

        #[cfg(feature = "walk")]
        {
            let discovery_options = DiscoveryOptions {
                include: options.include.clone(),
                exclude: options.exclude.clone(),
                root_dir: options.root_dir.clone(),
            };
            match discovery::discover_files(&discovery_options) {
                Ok(files) => files,
                Err(e) => {
                    warn!(error = %e, "file discovery failed, analyzing documented files only");
                    Vec::new()
                }
            }
        }

        #[cfg(not(feature = "walk"))]
        {
            debug!("walk feature disabled, analyzing documented files only");
            Vec::new()
        }
    }
}

fn validate_options(options: &ReportOptions) -> Result<()> {
    if options.include.is_empty() {
        return Err(Error::Validation(
            "at least one include pattern is required".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&options.threshold) {
        return Err(Error::Validation(format!(
            "threshold {} is outside [0, 100]",
            options.threshold
        )));
    }
    for (scope, threshold) in &options.scope_thresholds {
        if !(0.0..=100.0).contains(threshold) {
            return Err(Error::Validation(format!(
                "scope {scope:?} threshold {threshold} is outside [0, 100]"
            )));
        }
    }
    #[cfg(feature = "walk")]
    if options.scan_filesystem {
        discovery::validate_patterns(&options.include, &options.exclude)?;
    }
    Ok(())
}

/// Analyze one file of the union set. Never fails: unreadable files come back
/// with zero lines and no symbols.
fn analyze_file(
    ctx: &mut ReportContext,
    options: &ReportOptions,
    rel: &str,
    refs: Option<&FileRefs>,
) -> FileCoverage {
    let abs = options.root_dir.join(rel);
    let total_lines = line_count(ctx, &abs);

    // Full-file sentinel wins over partial ranges unconditionally.
    let covered_sections = match refs {
        Some(r) if r.full_file && total_lines > 0 => vec![Span::new(1, total_lines)],
        Some(r) if !r.full_file && !r.ranges.is_empty() => {
            interval::clamp_ranges(&interval::merge_ranges(&r.ranges), total_lines)
        }
        _ => Vec::new(),
    };
    let covered_lines: usize = covered_sections.iter().map(Span::line_count).sum();
    let uncovered_sections = interval::invert_ranges(&covered_sections, total_lines);

    // Symbol extraction runs even for fully undocumented files, so the
    // symbol-level rollup sees their 0% rather than defaulting.
    let content = std::fs::read_to_string(&abs).unwrap_or_else(|e| {
        debug!(path = %abs.display(), error = %e, "file unreadable, no symbols extracted");
        String::new()
    });
    let extraction = symbols::extract_symbols(Path::new(rel), &content);

    let mut functions = Vec::new();
    let mut classes = Vec::new();
    for sym in &extraction.symbols {
        match sym.kind {
            SymbolKind::Function => functions.push(SymbolCoverage {
                name: sym
                    .name
                    .clone()
                    .unwrap_or_else(|| "anonymous".to_string()),
                span: sym.span,
                is_covered: interval::range_overlaps_any(sym.span, &covered_sections),
            }),
            SymbolKind::Class => classes.push(SymbolCoverage {
                name: sym
                    .name
                    .clone()
                    .unwrap_or_else(|| "AnonymousClass".to_string()),
                span: sym.span,
                is_covered: interval::range_overlaps_any(sym.span, &covered_sections),
            }),
            _ => {}
        }
    }

    FileCoverage {
        path: rel.to_string(),
        total_lines,
        covered_lines,
        covered_sections,
        uncovered_sections,
        functions,
        classes,
    }
}

fn assemble_report(options: &ReportOptions, files: Vec<FileCoverage>) -> CoverageReport {
    let total_lines: usize = files.iter().map(|f| f.total_lines).sum();
    let covered_lines: usize = files.iter().map(|f| f.covered_lines).sum();

    let functions_total: usize = files.iter().map(|f| f.functions.len()).sum();
    let functions_covered: usize = files
        .iter()
        .map(|f| f.functions.iter().filter(|s| s.is_covered).count())
        .sum();
    let classes_total: usize = files.iter().map(|f| f.classes.len()).sum();
    let classes_covered: usize = files
        .iter()
        .map(|f| f.classes.iter().filter(|s| s.is_covered).count())
        .sum();

    let mut undocumented_files = Vec::new();
    let mut low_coverage_files = Vec::new();
    for file in &files {
        let pct = file.coverage_percentage();
        if pct == 0.0 {
            undocumented_files.push(file.path.clone());
        } else if pct < options.threshold {
            low_coverage_files.push(file.path.clone());
        }
    }

    let mut scopes = Vec::new();
    let mut scope_threshold_violations = Vec::new();
    for name in scope_names(options) {
        let prefix = format!("{}/", name.trim_end_matches('/'));
        let (scope_total, scope_covered) = files
            .iter()
            .filter(|f| f.path.starts_with(&prefix))
            .fold((0usize, 0usize), |(t, c), f| {
                (t + f.total_lines, c + f.covered_lines)
            });
        let pct = percentage(scope_covered, scope_total);
        let threshold = options.scope_thresholds.get(&name).copied();
        if let Some(threshold) = threshold {
            if pct < threshold {
                scope_threshold_violations.push(ScopeThresholdViolation {
                    scope: name.clone(),
                    actual: pct,
                    threshold,
                });
            }
        }
        scopes.push(ScopeSummary {
            name,
            total_lines: scope_total,
            covered_lines: scope_covered,
            coverage_percentage: pct,
            threshold,
        });
    }

    let recommendations = low_coverage_files
        .iter()
        .map(|path| Recommendation {
            file: path.clone(),
            message: RECOMMENDATION_MESSAGE.to_string(),
            priority: "medium".to_string(),
        })
        .collect();

    CoverageReport {
        summary: CoverageSummary {
            total_files: files.len(),
            total_lines,
            covered_lines,
            coverage_percentage: percentage(covered_lines, total_lines),
            undocumented_files,
            low_coverage_files,
            functions_total,
            functions_covered,
            classes_total,
            classes_covered,
            functions_coverage_percentage: symbol_percentage(
                functions_covered,
                functions_total,
                covered_lines,
            ),
            classes_coverage_percentage: symbol_percentage(
                classes_covered,
                classes_total,
                covered_lines,
            ),
            scopes,
            scope_threshold_violations,
        },
        files,
        recommendations,
        generated_at: Utc::now(),
    }
}

/// Scope names: configured threshold keys win; otherwise infer top-level
/// directory prefixes from the include patterns; otherwise the defaults.
fn scope_names(options: &ReportOptions) -> Vec<String> {
    if !options.scope_thresholds.is_empty() {
        return options.scope_thresholds.keys().cloned().collect();
    }

    let mut inferred: Vec<String> = Vec::new();
    for pattern in &options.include {
        let prefix = pattern
            .split(['*', '?', '{', '['])
            .next()
            .unwrap_or("")
            .trim_end_matches('/');
        let top = prefix.split('/').next().unwrap_or("");
        if !top.is_empty() && !top.contains('.') && !inferred.iter().any(|s| s == top) {
            inferred.push(top.to_string());
        }
    }
    if inferred.is_empty() {
        vec!["src".to_string(), "tests".to_string()]
    } else {
        inferred
    }
}

/// The vacuous-empty report returned when the documentation store is
/// unreachable: zero everything, 100% coverage.
fn empty_report() -> CoverageReport {
    CoverageReport {
        summary: CoverageSummary {
            total_files: 0,
            total_lines: 0,
            covered_lines: 0,
            coverage_percentage: 100.0,
            undocumented_files: Vec::new(),
            low_coverage_files: Vec::new(),
            functions_total: 0,
            functions_covered: 0,
            classes_total: 0,
            classes_covered: 0,
            functions_coverage_percentage: 0.0,
            classes_coverage_percentage: 0.0,
            scopes: Vec::new(),
            scope_threshold_violations: Vec::new(),
        },
        files: Vec::new(),
        recommendations: Vec::new(),
        generated_at: Utc::now(),
    }
}

/// Cached line count for one file within one report pass.
fn line_count(ctx: &mut ReportContext, path: &Path) -> usize {
    if let Some(&cached) = ctx.line_counts.get(path) {
        return cached;
    }
    let count = match stream_line_count(path) {
        Ok(n) => n,
        // Stream failure: retry with one buffered read before giving up.
        Err(_) => match std::fs::read(path) {
            Ok(bytes) => byte_line_count(&bytes),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "line count unavailable");
                0
            }
        },
    };
    ctx.line_counts.insert(path.to_path_buf(), count);
    count
}

/// Streaming newline counter. A non-empty file without a trailing newline
/// counts its final partial line.
fn stream_line_count(path: &Path) -> std::io::Result<usize> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = [0u8; 8192];
    let mut newlines = 0usize;
    let mut last = 0u8;
    let mut any = false;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        any = true;
        newlines += buf[..n].iter().filter(|b| **b == b'\n').count();
        last = buf[n - 1];
    }
    Ok(match (any, last) {
        (false, _) => 0,
        (true, b'\n') => newlines,
        (true, _) => newlines + 1,
    })
}

fn byte_line_count(bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    let newlines = bytes.iter().filter(|b| **b == b'\n').count();
    if bytes.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}
