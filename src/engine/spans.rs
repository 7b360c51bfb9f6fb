//! Applied style spans
//!
//! The spans the render pass has produced so far. They move with the
//! text on edits the way tags in a text widget do; stale ones are
//! replaced the next time their range is rendered.

use std::ops::Range;

use crate::syntax::Span;

/// Sorted, non-overlapping spans
#[derive(Debug, Clone, Default)]
pub struct SpanStore {
    spans: Vec<Span>,
}

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Spans overlapping `range`, clipped to it
    pub fn query(&self, range: Range<usize>) -> Vec<Span> {
        let first = self.spans.partition_point(|s| s.end <= range.start);
        self.spans[first..]
            .iter()
            .take_while(|s| s.start < range.end)
            .map(|s| Span::new(s.start.max(range.start), s.end.min(range.end), s.style.clone()))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Replace everything inside `range` with `spans`.
    ///
    /// Spans reaching outside `range` keep their outside parts. The new
    /// spans must be sorted, disjoint and inside `range`.
    pub fn replace(&mut self, range: Range<usize>, spans: Vec<Span>) {
        let first = self.spans.partition_point(|s| s.end <= range.start);
        let last = first
            + self.spans[first..]
                .iter()
                .take_while(|s| s.start < range.end)
                .count();

        let mut merged = Vec::with_capacity(spans.len() + 2);
        if let Some(head) = self.spans[first..last].first() {
            if head.start < range.start {
                merged.push(Span::new(head.start, range.start, head.style.clone()));
            }
        }
        merged.extend(spans.into_iter().filter(|s| !s.is_empty()));
        if let Some(tail) = self.spans[first..last].last() {
            if tail.end > range.end {
                merged.push(Span::new(range.end, tail.end, tail.style.clone()));
            }
        }
        self.spans.splice(first..last, merged);
    }

    /// Follow an insertion of `len` chars at `pos`
    pub fn adjust_for_insert(&mut self, pos: usize, len: usize) {
        for span in &mut self.spans {
            if span.start >= pos {
                span.start += len;
                span.end += len;
            } else if span.end > pos {
                span.end += len;
            }
        }
    }

    /// Follow a deletion of `[start, end)`
    pub fn adjust_for_delete(&mut self, start: usize, end: usize) {
        let len = end.saturating_sub(start);
        if len == 0 {
            return;
        }
        let map = |p: usize| {
            if p <= start {
                p
            } else if p >= end {
                p - len
            } else {
                start
            }
        };
        for span in &mut self.spans {
            span.start = map(span.start);
            span.end = map(span.end);
        }
        self.spans.retain(|s| !s.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::StyleId;

    fn span(start: usize, end: usize, style: &str) -> Span {
        Span::new(start, end, StyleId::new(style))
    }

    #[test]
    fn test_replace_inside() {
        let mut store = SpanStore::new();
        store.replace(0..100, vec![span(0, 10, "comment"), span(20, 30, "string")]);
        store.replace(15..40, vec![span(16, 18, "number")]);
        assert_eq!(store.query(0..100), vec![span(0, 10, "comment"), span(16, 18, "number")]);
    }

    #[test]
    fn test_replace_keeps_outside_parts() {
        let mut store = SpanStore::new();
        store.replace(0..100, vec![span(0, 50, "comment")]);
        store.replace(10..20, vec![]);
        assert_eq!(store.query(0..100), vec![span(0, 10, "comment"), span(20, 50, "comment")]);
    }

    #[test]
    fn test_query_clips() {
        let mut store = SpanStore::new();
        store.replace(0..100, vec![span(5, 15, "string")]);
        assert_eq!(store.query(10..12), vec![span(10, 12, "string")]);
        assert!(store.query(15..20).is_empty());
    }

    #[test]
    fn test_adjust_for_edits() {
        let mut store = SpanStore::new();
        store.replace(0..100, vec![span(0, 5, "a"), span(10, 20, "b"), span(30, 40, "c")]);
        store.adjust_for_insert(12, 3);
        assert_eq!(store.query(0..100)[1], span(10, 23, "b"));
        store.adjust_for_delete(8, 33);
        assert_eq!(store.query(0..100), vec![span(0, 5, "a"), span(8, 18, "c")]);
    }
}
