//! Flat pattern matching
//!
//! Applies the single-regex patterns to text outside syntax regions.
//! Each pattern keeps its next match cached; after a match is taken only
//! the patterns whose cached match it consumed are searched again.

use std::ops::Range;

use crate::document::next_char_boundary;
use crate::syntax::PatternDef;

/// A flat match, in bytes of the searched text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatMatch {
    /// Index of the pattern in declaration order
    pub pattern: usize,
    pub start: usize,
    pub end: usize,
}

/// Find the non-overlapping flat matches in `text[from..]`.
///
/// Matches come out in increasing start order. Among cached matches tied
/// at the same start the longer one wins, then the earlier pattern.
pub fn search_patterns(patterns: &[PatternDef], text: &str, from: usize) -> Vec<FlatMatch> {
    let mut next: Vec<Option<Range<usize>>> = patterns
        .iter()
        .map(|p| next_match(p, text, from))
        .collect();
    let mut matches = Vec::new();

    loop {
        let best = next
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().map(|m| (i, m.clone())))
            .min_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let Some((pattern, found)) = best else {
            break;
        };

        let pos = found.end;
        matches.push(FlatMatch {
            pattern,
            start: found.start,
            end: found.end,
        });

        for (i, slot) in next.iter_mut().enumerate() {
            if matches!(slot, Some(m) if m.start < pos) {
                *slot = next_match(&patterns[i], text, pos);
            }
        }
    }

    matches
}

/// Next non-empty match of `pattern` at or after byte `from`
fn next_match(pattern: &PatternDef, text: &str, from: usize) -> Option<Range<usize>> {
    let mut pos = from;
    while pos <= text.len() {
        let m = pattern.regex.find_at(text, pos)?;
        if !m.is_empty() {
            return Some(m.range());
        }
        log::warn!("pattern `{}` matched empty text at byte {}, ignored", pattern.id, m.start());
        pos = next_char_boundary(text, m.start());
    }
    None
}
