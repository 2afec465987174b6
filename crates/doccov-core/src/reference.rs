//! Source-reference string parsing.
//!
//! Documentation entries name what they cover with a compact grammar:
//!
//! ```text
//! reference := path ( ":" range ("," range)* )?
//! range     := INTEGER "-" INTEGER        ; START <= END, both >= 1
//! path      := relative path, no "..", no absolute prefix, no NUL
//! ```
//!
//! `"src/api.ts"` claims the whole file; `"src/api.ts:1-10,20-30"` claims two
//! line ranges. Parsing and path safety are separate failure kinds
//! ([`Error::InvalidFormat`] and [`Error::UnsafePath`]) because the
//! aggregator logs them differently; both are skip-and-log, never abort.

use crate::error::{Error, Result};
use crate::interval::Span;

/// A parsed documentation reference: which file, and which lines of it.
///
/// An empty `ranges` list is the full-file sentinel: the entire file is
/// claimed as documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// Project-relative, forward-slash path.
    pub file_path: String,
    /// Claimed line ranges; empty means the whole file.
    pub ranges: Vec<Span>,
}

/// Parse a source-reference string into a [`SourceReference`].
pub fn parse_source_reference(raw: &str) -> Result<SourceReference> {
    let (path_part, range_part) = match raw.split_once(':') {
        Some((p, r)) => (p, Some(r)),
        None => (raw, None),
    };

    validate_path_safety(path_part)?;

    let ranges = match range_part {
        None => Vec::new(),
        Some(r) => parse_ranges(raw, r)?,
    };

    Ok(SourceReference {
        file_path: normalize_path(path_part),
        ranges,
    })
}

/// Reject absolute paths, parent traversal, and NUL bytes.
///
/// This runs on every reference path and on every glob pattern before either
/// reaches the filesystem layer.
pub fn validate_path_safety(path: &str) -> Result<()> {
    let unsafe_path = |reason| Error::UnsafePath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(unsafe_path("empty path"));
    }
    if path.contains('\0') {
        return Err(unsafe_path("NUL byte in path"));
    }
    if path.starts_with('/') || path.starts_with('\\') || std::path::Path::new(path).is_absolute() {
        return Err(unsafe_path("absolute path"));
    }

    // Normalize and make sure no prefix of the path escapes the project root.
    let mut depth: isize = 0;
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                depth -= 1;
                if depth < 0 {
                    return Err(unsafe_path("parent traversal"));
                }
            }
            _ => depth += 1,
        }
    }
    Ok(())
}

fn parse_ranges(raw: &str, range_part: &str) -> Result<Vec<Span>> {
    let invalid = |reason: String| Error::InvalidFormat {
        raw: raw.to_string(),
        reason,
    };

    if range_part.is_empty() {
        return Err(invalid("empty range list after ':'".into()));
    }

    let mut ranges = Vec::new();
    for piece in range_part.split(',') {
        let Some((start_s, end_s)) = piece.split_once('-') else {
            return Err(invalid(format!("range {piece:?} is not START-END")));
        };
        let start: usize = start_s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("range start {start_s:?} is not an integer")))?;
        let end: usize = end_s
            .trim()
            .parse()
            .map_err(|_| invalid(format!("range end {end_s:?} is not an integer")))?;
        if start < 1 {
            return Err(invalid(format!("range start {start} must be >= 1")));
        }
        if end < start {
            return Err(invalid(format!("range {start}-{end} has END < START")));
        }
        ranges.push(Span::new(start, end));
    }
    Ok(ranges)
}

/// Forward-slash the path and strip a leading `./` so reference paths unify
/// with discovered paths.
fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    slashed
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(slashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file_sentinel() {
        let parsed = parse_source_reference("src/api.ts").unwrap();
        assert_eq!(parsed.file_path, "src/api.ts");
        assert!(parsed.ranges.is_empty());
    }

    #[test]
    fn test_parse_single_range() {
        let parsed = parse_source_reference("src/api.ts:1-10").unwrap();
        assert_eq!(parsed.ranges, vec![Span::new(1, 10)]);
    }

    #[test]
    fn test_parse_multiple_ranges() {
        let parsed = parse_source_reference("src/api.ts:1-10,20-30").unwrap();
        assert_eq!(parsed.ranges, vec![Span::new(1, 10), Span::new(20, 30)]);
    }

    #[test]
    fn test_parse_single_line_range() {
        let parsed = parse_source_reference("src/api.ts:7-7").unwrap();
        assert_eq!(parsed.ranges, vec![Span::new(7, 7)]);
    }

    #[test]
    fn test_reject_reversed_range() {
        let err = parse_source_reference("src/api.ts:10-1").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_reject_zero_start() {
        let err = parse_source_reference("src/api.ts:0-5").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_reject_garbage_ranges() {
        for raw in [
            "src/api.ts:",
            "src/api.ts:abc",
            "src/api.ts:1-",
            "src/api.ts:-5",
            "src/api.ts:1-2,",
            "src/api.ts:1..5",
        ] {
            let err = parse_source_reference(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidFormat { .. }), "raw: {raw}");
        }
    }

    #[test]
    fn test_reject_absolute_path() {
        let err = parse_source_reference("/etc/passwd:1-1").unwrap_err();
        assert!(matches!(err, Error::UnsafePath { .. }));
    }

    #[test]
    fn test_reject_parent_traversal() {
        for raw in ["../secrets.ts", "src/../../x.ts", ".."] {
            let err = parse_source_reference(raw).unwrap_err();
            assert!(matches!(err, Error::UnsafePath { .. }), "raw: {raw}");
        }
    }

    #[test]
    fn test_interior_dotdot_that_stays_inside_root_is_fine() {
        // src/sub/../api.ts normalizes to src/api.ts, never escaping the root
        let parsed = parse_source_reference("src/sub/../api.ts:1-2").unwrap();
        assert_eq!(parsed.ranges, vec![Span::new(1, 2)]);
    }

    #[test]
    fn test_reject_nul_byte() {
        let err = parse_source_reference("src/a\0.ts").unwrap_err();
        assert!(matches!(err, Error::UnsafePath { .. }));
    }

    #[test]
    fn test_path_normalization() {
        let parsed = parse_source_reference("./src\\sub\\api.ts").unwrap();
        assert_eq!(parsed.file_path, "src/sub/api.ts");
    }
}
