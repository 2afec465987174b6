//! Symbol extraction from source files.
//!
//! Given file content and its extension, this module produces the spans of
//! functions, classes, methods, interfaces, imports, exports, and comments,
//! plus the file's total line count. Two strategies exist:
//!
//! 1. **Structural** (feature `structural`, preferred): a full tree-sitter
//!    parse of the TypeScript grammar, which also covers JavaScript. Used for
//!    `.ts .tsx .js .jsx .mjs .cjs`.
//! 2. **Heuristic**: line-by-line regex matching over the same categories.
//!    Used when the structural parse fails, and always for component formats
//!    (`.vue .svelte .astro`) whose mixed syntax the grammar does not accept.
//!
//! Strategy selection is a tagged result, not a caught panic: callers get
//! [`try_structural_parse`]'s `Err(ParseFailure)` and fall back explicitly.
//! The heuristic is knowingly approximate (it cannot disambiguate every
//! arrow-function assignment form); that trade-off buys robustness on files
//! the structural parser rejects.
//!
//! Markdown (`.md .mdx`) and unrecognized extensions yield an empty symbol
//! set but still report a total line count.

use crate::interval::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Extensions that symbol extraction understands at all.
///
/// This doubles as the discovery allow-list: anything else found by a glob is
/// not a source file for coverage purposes.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte", "astro", "mdx", "md",
];

/// Extensions handed to the structural parser first.
const STRUCTURAL_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Extensions that only ever get the heuristic scan.
const HEURISTIC_ONLY_EXTENSIONS: &[&str] = &["vue", "svelte", "astro"];

/// Check if a file extension is recognized as a coverage source extension.
pub fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.contains(&ext)
}

/// The kind of symbol a span describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    Interface,
    Import,
    Export,
    Comment,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Method => "method",
            SymbolKind::Interface => "interface",
            SymbolKind::Import => "import",
            SymbolKind::Export => "export",
            SymbolKind::Comment => "comment",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted symbol and the 1-indexed line range it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpan {
    pub kind: SymbolKind,
    /// Missing when the heuristic path cannot recover a name; consumers fill
    /// in `"anonymous"` / `"AnonymousClass"`.
    pub name: Option<String>,
    pub span: Span,
}

/// Which strategy produced an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Structural,
    Heuristic,
    /// No strategy applies to this extension; only the line count is real.
    None,
}

/// Why a structural parse was rejected.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub reason: String,
}

/// The result of scanning one file.
#[derive(Debug, Clone)]
pub struct SymbolExtraction {
    pub symbols: Vec<SymbolSpan>,
    pub total_lines: usize,
    pub strategy: ExtractionStrategy,
}

/// Count lines the way the rest of the engine does: newline-delimited, with a
/// trailing partial line counting as a line.
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.bytes().filter(|b| *b == b'\n').count();
    if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Extract symbols from `content`, choosing the strategy from the path's
/// extension and the structural parser's verdict.
pub fn extract_symbols(path: &Path, content: &str) -> SymbolExtraction {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let total_lines = count_lines(content);

    if STRUCTURAL_EXTENSIONS.contains(&ext) {
        #[cfg(feature = "structural")]
        match try_structural_parse(content) {
            Ok(symbols) => {
                return SymbolExtraction {
                    symbols,
                    total_lines,
                    strategy: ExtractionStrategy::Structural,
                };
            }
            Err(failure) => {
                tracing::debug!(
                    path = %path.display(),
                    reason = %failure.reason,
                    "structural parse failed, falling back to heuristic scan"
                );
            }
        }
        return SymbolExtraction {
            symbols: heuristic_scan(content),
            total_lines,
            strategy: ExtractionStrategy::Heuristic,
        };
    }

    if HEURISTIC_ONLY_EXTENSIONS.contains(&ext) {
        return SymbolExtraction {
            symbols: heuristic_scan(content),
            total_lines,
            strategy: ExtractionStrategy::Heuristic,
        };
    }

    SymbolExtraction {
        symbols: Vec::new(),
        total_lines,
        strategy: ExtractionStrategy::None,
    }
}

/// Parse `content` with the TypeScript grammar and walk the tree for symbol
/// spans. Returns `Err` when the grammar cannot produce a clean tree, which
/// routes the file to the heuristic scan.
#[cfg(feature = "structural")]
pub fn try_structural_parse(content: &str) -> Result<Vec<SymbolSpan>, ParseFailure> {
    use arborium::tree_sitter::Parser;

    let mut parser = Parser::new();
    parser
        .set_language(&arborium_typescript::language().into())
        .map_err(|e| ParseFailure {
            reason: format!("failed to load TypeScript grammar: {e}"),
        })?;

    let Some(tree) = parser.parse(content, None) else {
        return Err(ParseFailure {
            reason: "parser produced no tree".to_string(),
        });
    };

    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseFailure {
            reason: "syntax tree contains error nodes".to_string(),
        });
    }

    let mut symbols = Vec::new();
    collect_structural(content, root, &mut symbols);
    Ok(symbols)
}

#[cfg(feature = "structural")]
fn collect_structural(
    source: &str,
    node: arborium::tree_sitter::Node,
    symbols: &mut Vec<SymbolSpan>,
) {
    let span = Span::new(node.start_position().row + 1, node.end_position().row + 1);

    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Function,
                name: node_name(source, node),
                span,
            });
        }
        "class_declaration" | "abstract_class_declaration" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Class,
                name: node_name(source, node),
                span,
            });
        }
        "method_definition" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Method,
                name: node_name(source, node),
                span,
            });
        }
        "interface_declaration" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Interface,
                name: node_name(source, node),
                span,
            });
        }
        "import_statement" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Import,
                name: None,
                span,
            });
        }
        "export_statement" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Export,
                name: None,
                span,
            });
        }
        "comment" => {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Comment,
                name: None,
                span,
            });
        }
        // const/let/var bindings whose initializer is a function value count
        // as function declarations under the declarator's name.
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(value) = declarator.child_by_field_name("value") else {
                    continue;
                };
                if matches!(
                    value.kind(),
                    "arrow_function" | "function_expression" | "function" | "generator_function"
                ) {
                    symbols.push(SymbolSpan {
                        kind: SymbolKind::Function,
                        name: node_name(source, declarator),
                        span: Span::new(
                            declarator.start_position().row + 1,
                            declarator.end_position().row + 1,
                        ),
                    });
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_structural(source, child, symbols);
    }
}

#[cfg(feature = "structural")]
fn node_name(source: &str, node: arborium::tree_sitter::Node) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| source[n.byte_range()].to_string())
}

static RE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\b\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)?",
    )
    .unwrap()
});

static RE_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)[^=]*=.*(?:=>|\bfunction\b)",
    )
    .unwrap()
});

static RE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\b(?:\s+([A-Za-z_$][A-Za-z0-9_$]*))?",
    )
    .unwrap()
});

static RE_INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

/// Line-by-line regex scan. Every matched symbol spans exactly the line it
/// was matched on.
pub fn heuristic_scan(content: &str) -> Vec<SymbolSpan> {
    let mut symbols = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let span = Span::new(line_no, line_no);
        let trimmed = line.trim_start();

        // Comment-like prefixes win over everything else on the line.
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with('/') {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Comment,
                name: None,
                span,
            });
            continue;
        }

        if let Some(caps) = RE_INTERFACE.captures(line) {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Interface,
                name: caps.get(1).map(|m| m.as_str().to_string()),
                span,
            });
            continue;
        }

        if RE_CLASS.is_match(line) && trimmed.contains("class") {
            let name = RE_CLASS
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            symbols.push(SymbolSpan {
                kind: SymbolKind::Class,
                name,
                span,
            });
            continue;
        }

        if trimmed.starts_with("function")
            || trimmed.contains("function ")
            || trimmed.contains("function(")
            || trimmed.contains("function*")
        {
            if let Some(caps) = RE_FUNCTION.captures(line) {
                symbols.push(SymbolSpan {
                    kind: SymbolKind::Function,
                    name: caps.get(1).map(|m| m.as_str().to_string()),
                    span,
                });
                continue;
            }
        }

        if let Some(caps) = RE_ARROW.captures(line) {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Function,
                name: caps.get(1).map(|m| m.as_str().to_string()),
                span,
            });
            continue;
        }

        if trimmed.starts_with("import") {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Import,
                name: None,
                span,
            });
            continue;
        }

        if trimmed.starts_with("export") {
            symbols.push(SymbolSpan {
                kind: SymbolKind::Export,
                name: None,
                span,
            });
        }
    }

    symbols
}
