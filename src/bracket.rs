//! Bracket matching
//!
//! Finds the partner of the bracket just before the cursor. Only brackets
//! in the same lexical class as the origin count, so a `)` inside a
//! string does not close a `(` in code. Nothing is cached; the scan is
//! redone on every call.

use crate::document::Document;
use crate::syntax::SyntaxId;

/// Opening and closing chars of each supported pair
const PAIRS: [(char, char); 4] = [('(', ')'), ('{', '}'), ('[', ']'), ('<', '>')];

/// Partner of `c` and whether it lies forward
fn partner(c: char) -> Option<(char, bool)> {
    PAIRS.iter().find_map(|&(open, close)| {
        if c == open {
            Some((close, true))
        } else if c == close {
            Some((open, false))
        } else {
            None
        }
    })
}

/// Offset of the bracket matching the char before `pos`.
///
/// `limit` caps how many chars are scanned; `None` scans to the document
/// boundary. `class_at` reports the syntax region covering an offset.
pub fn find_matching_bracket(
    doc: &dyn Document,
    pos: usize,
    limit: Option<usize>,
    class_at: impl Fn(usize) -> Option<SyntaxId>,
) -> Option<usize> {
    let origin = pos.checked_sub(1)?;
    let bracket = doc.char_at(origin)?;
    let (other, forward) = partner(bracket)?;
    let class = class_at(origin);
    let len = doc.len_chars();
    let reach = limit.unwrap_or(usize::MAX);

    let window = if forward {
        pos..len.min(pos.saturating_add(reach))
    } else {
        origin.saturating_sub(reach)..origin
    };
    let text = doc.text(window.clone());

    let mut depth = 1usize;
    let mut visit = |offset: usize, c: char| -> Option<usize> {
        if (c != bracket && c != other) || class_at(offset) != class {
            return None;
        }
        if c == bracket {
            depth += 1;
            return None;
        }
        depth -= 1;
        (depth == 0).then_some(offset)
    };

    if forward {
        text.chars()
            .enumerate()
            .find_map(|(i, c)| visit(window.start + i, c))
    } else {
        text.chars()
            .rev()
            .enumerate()
            .find_map(|(i, c)| visit(window.end - 1 - i, c))
    }
}
