//! Glob-driven source file discovery.
//!
//! Walks a project tree with include/exclude glob patterns (`*`, `**`, `?`,
//! `{}`, `[]` via `globset`), keeps only regular files with a recognized
//! source extension, drops generated-artifact paths by substring marker, and
//! returns forward-slash paths relative to the root. The walk is deliberately
//! gitignore-unaware: the include/exclude lists are the entire contract.

use crate::error::{Error, Result};
use crate::reference::validate_path_safety;
use crate::symbols::{count_lines, is_source_extension};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Path substrings that mark a file as generated or non-primary even when its
/// extension is on the allow-list.
pub const EXCLUDED_PATH_MARKERS: &[&str] = &[
    ".d.ts", ".map", ".min.", ".bundle.", ".test.", ".spec.", ".stories.", ".config.",
];

/// What to walk and how to filter it.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Include glob patterns, relative to `root_dir`. Must be non-empty.
    pub include: Vec<String>,
    /// Exclude glob patterns, applied as an ignore list.
    pub exclude: Vec<String>,
    pub root_dir: PathBuf,
}

/// Preview output of [`dry_run`]: what a discovery would find, what it would
/// drop, and a rough line-count estimate. The estimate averages up to 5
/// sampled files and multiplies by the file count; it is never used for the
/// authoritative report.
#[derive(Debug, Clone)]
pub struct DryRunPreview {
    pub files: Vec<String>,
    /// Files that matched an include pattern and carry a source extension but
    /// were dropped by an exclude pattern or path marker.
    pub excluded_source_like: Vec<String>,
    pub estimated_total_lines: usize,
}

struct Matchers {
    include: GlobSet,
    exclude: GlobSet,
}

fn build_matchers(options: &DiscoveryOptions) -> Result<Matchers> {
    if options.include.is_empty() {
        return Err(Error::Validation(
            "at least one include pattern is required".to_string(),
        ));
    }

    let compile = |patterns: &[String]| -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            validate_path_safety(pattern)
                .map_err(|e| Error::Validation(format!("unsafe glob pattern: {e}")))?;
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| Error::Validation(format!("malformed glob {pattern:?}: {e}")))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| Error::Validation(format!("glob set: {e}")))
    };

    Ok(Matchers {
        include: compile(&options.include)?,
        exclude: compile(&options.exclude)?,
    })
}

/// Validate include/exclude patterns without walking anything.
///
/// Lets the aggregator surface `Validation` errors synchronously, before any
/// I/O happens.
pub fn validate_patterns(include: &[String], exclude: &[String]) -> Result<()> {
    build_matchers(&DiscoveryOptions {
        include: include.to_vec(),
        exclude: exclude.to_vec(),
        root_dir: PathBuf::new(),
    })
    .map(|_| ())
}

/// Discover source files under `root_dir`, sorted, as forward-slash relative
/// paths.
pub fn discover_files(options: &DiscoveryOptions) -> Result<Vec<String>> {
    let matchers = build_matchers(options)?;
    let (mut files, _) = walk(options, &matchers)?;
    files.sort();
    Ok(files)
}

/// Discovery preview: included files, excluded-but-source-like files, and a
/// sampled line-count estimate.
pub fn dry_run(options: &DiscoveryOptions) -> Result<DryRunPreview> {
    let matchers = build_matchers(options)?;
    let (mut files, mut excluded) = walk(options, &matchers)?;
    files.sort();
    excluded.sort();

    let sample: Vec<usize> = files
        .iter()
        .take(5)
        .filter_map(|rel| std::fs::read_to_string(options.root_dir.join(rel)).ok())
        .map(|content| count_lines(&content))
        .collect();
    let estimated_total_lines = if sample.is_empty() {
        0
    } else {
        let avg = sample.iter().sum::<usize>() as f64 / sample.len() as f64;
        (avg * files.len() as f64).round() as usize
    };

    Ok(DryRunPreview {
        files,
        excluded_source_like: excluded,
        estimated_total_lines,
    })
}

/// Returns `(included, excluded_source_like)`.
fn walk(options: &DiscoveryOptions, matchers: &Matchers) -> Result<(Vec<String>, Vec<String>)> {
    let root = &options.root_dir;
    if !root.is_dir() {
        return Err(Error::Scan {
            root: root.clone(),
            message: "root directory does not exist".to_string(),
        });
    }

    let mut included = Vec::new();
    let mut excluded_source_like = Vec::new();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let rel = relative_slash_path(path, root);

        if !matchers.include.is_match(&rel) {
            continue;
        }

        let has_source_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_source_extension);

        if matchers.exclude.is_match(&rel) {
            if has_source_ext {
                excluded_source_like.push(rel);
            }
            continue;
        }
        if !has_source_ext {
            continue;
        }
        if EXCLUDED_PATH_MARKERS.iter().any(|m| rel.contains(m)) {
            excluded_source_like.push(rel);
            continue;
        }

        included.push(rel);
    }

    Ok((included, excluded_source_like))
}

fn relative_slash_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}
