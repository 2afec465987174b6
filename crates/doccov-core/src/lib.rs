//! doccov-core - Core library for documentation coverage analysis
//!
//! This crate provides the building blocks for:
//! - Parsing documentation references (`"src/api.ts:1-10,20-30"`) into typed
//!   file + line-range claims
//! - Discovering source files from a project tree with include/exclude globs
//! - Extracting function/class/interface symbols from TypeScript and
//!   JavaScript sources (tree-sitter, with a regex fallback)
//! - Aggregating everything into a per-file, per-symbol, per-scope coverage
//!   report with threshold violations
//!
//! # Features
//!
//! - `walk` - Enable [`discovery`] for glob-driven directory walking (brings
//!   in `ignore` and `globset`)
//! - `structural` - Enable tree-sitter structural parsing in [`symbols`]
//!   (brings in `arborium`); without it every file takes the regex path
//!
//! # Generating a report
//!
//! The engine asks a [`DocumentationStore`] for its reference owners, walks
//! the project tree, and reconciles the two file sets: a source file nobody
//! documented still shows up, at 0%.
//!
//! ```ignore
//! use doccov_core::{CoverageAggregator, JsonStore, ReportOptions};
//!
//! let store = JsonStore::new("docrefs.json");
//! let aggregator = CoverageAggregator::new(store);
//! let report = aggregator.generate_report(&ReportOptions {
//!     root_dir: ".".into(),
//!     ..ReportOptions::default()
//! })?;
//! println!("Coverage: {:.1}%", report.summary.coverage_percentage);
//! ```
//!
//! # In-memory stores (for testing/embedding)
//!
//! Use [`MemoryStore`] when documentation lives somewhere the engine should
//! not know about:
//!
//! ```
//! use doccov_core::{CoverageAggregator, MemoryStore, ReportOptions};
//!
//! let store = MemoryStore::new()
//!     .owner("note-1", "API docs", ["src/api.ts:1-10"]);
//!
//! let report = CoverageAggregator::new(store)
//!     .generate_report(&ReportOptions {
//!         scan_filesystem: false,
//!         ..ReportOptions::default()
//!     })
//!     .unwrap();
//!
//! // The referenced file does not exist here, so its total is 0 lines and
//! // the vacuous-coverage convention reports 100%.
//! assert_eq!(report.summary.total_files, 1);
//! assert_eq!(report.summary.coverage_percentage, 100.0);
//! ```

mod aggregator;
#[cfg(feature = "walk")]
pub mod discovery;
mod error;
pub mod interval;
mod reference;
mod report;
mod store;
pub mod symbols;

pub use aggregator::{
    CoverageAggregator, ProgressObserver, ReportOptions, DEFAULT_THRESHOLD,
};
pub use error::{Error, Result};
pub use interval::Span;
pub use reference::{parse_source_reference, validate_path_safety, SourceReference};
pub use report::{
    percentage, symbol_percentage, CoverageReport, CoverageSummary, FileCoverage, Recommendation,
    ScopeSummary, ScopeThresholdViolation, SymbolCoverage,
};
pub use store::{DocumentationStore, JsonStore, MemoryStore, ReferenceOwner};
pub use symbols::{SymbolKind, SymbolSpan, SOURCE_EXTENSIONS};

#[cfg(feature = "walk")]
pub use discovery::{discover_files, dry_run, DiscoveryOptions, DryRunPreview};
