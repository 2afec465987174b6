//! Interval algebra over 1-indexed, inclusive line ranges.
//!
//! Everything in this module is pure: the aggregator feeds it the ranges
//! claimed by documentation references and gets back the merged covered
//! sections and their complement within a file.

use serde::{Deserialize, Serialize};

/// An inclusive 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First line of the range (1-indexed).
    pub start: usize,
    /// Last line of the range, `end >= start`.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start >= 1 && end >= start);
        Self { start, end }
    }

    /// Number of lines covered by this span. Never zero.
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether this span shares at least one line with `other`.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// Merge a set of spans into a sorted, disjoint, non-adjacent set.
///
/// Spans are sorted by `(start asc, end asc)` and folded left; a span is
/// merged into its predecessor when `start <= prev.end + 1`, so adjacency
/// (not just overlap) collapses into one span. Gaps between returned spans
/// are therefore always at least 2 lines wide.
pub fn merge_ranges(spans: &[Span]) -> Vec<Span> {
    if spans.is_empty() {
        return Vec::new();
    }

    let mut sorted = spans.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for cur in sorted {
        match merged.last_mut() {
            Some(prev) if cur.start <= prev.end.saturating_add(1) => {
                prev.end = prev.end.max(cur.end);
            }
            _ => merged.push(cur),
        }
    }
    merged
}

/// Complement of `merged` within `[1, total]`.
///
/// `merged` must be sorted and disjoint (the output of [`merge_ranges`]).
/// Returns `[]` when `total == 0`, and `[{1, total}]` when `merged` is empty
/// and `total > 0`. Spans outside `[1, total]` contribute nothing.
pub fn invert_ranges(merged: &[Span], total: usize) -> Vec<Span> {
    if total == 0 {
        return Vec::new();
    }

    let mut gaps = Vec::new();
    let mut cursor = 1usize;
    for span in merged {
        if span.start > total {
            break;
        }
        if span.start > cursor {
            gaps.push(Span::new(cursor, span.start - 1));
        }
        cursor = cursor.max(span.end.saturating_add(1));
        if cursor > total {
            return gaps;
        }
    }
    if cursor <= total {
        gaps.push(Span::new(cursor, total));
    }
    gaps
}

/// Whether `span` shares at least one line with any span in `spans`.
pub fn range_overlaps_any(span: Span, spans: &[Span]) -> bool {
    spans.iter().any(|s| span.overlaps(s))
}

/// Clamp a merged span set to `[1, total]`, dropping spans past the end.
///
/// Keeps the partition invariant honest when a reference claims lines beyond
/// the file's actual length.
pub fn clamp_ranges(merged: &[Span], total: usize) -> Vec<Span> {
    if total == 0 {
        return Vec::new();
    }
    merged
        .iter()
        .filter(|s| s.start <= total)
        .map(|s| Span::new(s.start, s.end.min(total)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_ranges(&[span(1, 10), span(5, 15)]);
        assert_eq!(merged, vec![span(1, 15)]);
    }

    #[test]
    fn test_merge_adjacent() {
        // 1-10 and 11-20 touch, so they collapse into one span
        let merged = merge_ranges(&[span(1, 10), span(11, 20)]);
        assert_eq!(merged, vec![span(1, 20)]);
    }

    #[test]
    fn test_merge_keeps_gaps_of_two_or_more() {
        let merged = merge_ranges(&[span(1, 10), span(12, 20)]);
        assert_eq!(merged, vec![span(1, 10), span(12, 20)]);
    }

    #[test]
    fn test_merge_unsorted_input() {
        let merged = merge_ranges(&[span(20, 30), span(1, 10), span(8, 12)]);
        assert_eq!(merged, vec![span(1, 12), span(20, 30)]);
    }

    #[test]
    fn test_merge_contained_span() {
        let merged = merge_ranges(&[span(1, 100), span(20, 30)]);
        assert_eq!(merged, vec![span(1, 100)]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_ranges(&[]).is_empty());
    }

    #[test]
    fn test_merge_idempotent() {
        let input = [span(3, 7), span(1, 2), span(10, 12), span(11, 15)];
        let once = merge_ranges(&input);
        let twice = merge_ranges(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invert_empty_input() {
        assert_eq!(invert_ranges(&[], 40), vec![span(1, 40)]);
    }

    #[test]
    fn test_invert_zero_total() {
        assert!(invert_ranges(&[span(1, 10)], 0).is_empty());
    }

    #[test]
    fn test_invert_middle_gap() {
        let merged = merge_ranges(&[span(1, 10), span(20, 30)]);
        let gaps = invert_ranges(&merged, 40);
        assert_eq!(gaps, vec![span(11, 19), span(31, 40)]);
    }

    #[test]
    fn test_invert_full_coverage() {
        assert!(invert_ranges(&[span(1, 40)], 40).is_empty());
    }

    #[test]
    fn test_invert_span_past_total() {
        let gaps = invert_ranges(&[span(35, 60)], 40);
        assert_eq!(gaps, vec![span(1, 34)]);
    }

    #[test]
    fn test_merge_and_invert_partition() {
        // merge(S) and invert(merge(S), N) together tile [1, N] exactly
        let total = 50;
        let input = [span(2, 5), span(4, 9), span(11, 11), span(30, 42)];
        let merged = merge_ranges(&input);
        let gaps = invert_ranges(&merged, total);

        let mut all: Vec<Span> = merged.iter().chain(gaps.iter()).copied().collect();
        all.sort_by_key(|s| s.start);

        let mut expect_next = 1;
        for s in &all {
            assert_eq!(s.start, expect_next, "tiles must be contiguous");
            expect_next = s.end + 1;
        }
        assert_eq!(expect_next, total + 1);
    }

    #[test]
    fn test_merged_spans_never_adjacent() {
        let input = [span(1, 3), span(7, 9), span(5, 5), span(20, 25)];
        let merged = merge_ranges(&input);
        for pair in merged.windows(2) {
            assert!(pair[1].start >= pair[0].end + 2);
        }
    }

    #[test]
    fn test_overlaps_any() {
        let spans = [span(1, 10), span(20, 30)];
        assert!(range_overlaps_any(span(5, 25), &spans));
        assert!(range_overlaps_any(span(10, 11), &spans));
        assert!(!range_overlaps_any(span(11, 19), &spans));
        assert!(!range_overlaps_any(span(31, 40), &spans));
    }

    #[test]
    fn test_clamp_ranges() {
        let merged = [span(1, 10), span(35, 60), span(70, 80)];
        assert_eq!(clamp_ranges(&merged, 40), vec![span(1, 10), span(35, 40)]);
        assert!(clamp_ranges(&merged, 0).is_empty());
    }
}
