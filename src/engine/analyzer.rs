//! Incremental analyzer
//!
//! Builds the delimiter table in batches and keeps it consistent with
//! the document as edits arrive. Two edit paths exist:
//!
//! - [`Analyzer::update`]: re-derive the boundaries of the edited lines
//!   and, when they come out exactly as before, shift the rest of the
//!   table by the edit delta.
//! - [`Analyzer::invalidate`]: truncate the table at the edited line and
//!   save the suffix past the edit. Rebuilding stops as soon as it
//!   reproduces a saved boundary; the remainder is spliced back verbatim.
//!
//! Scanning always restarts at a close boundary (or offset 0) in the
//! Outside state, and at the start of the line, so anchors and escape
//! checks see the same context a full scan would.

use std::ops::Range;

use super::delimiter::{
    locate_before, shift, Delimiter, DelimiterTable, Resume, SavedTable, ScanState,
};
use crate::document::{byte_of_char, CharCounter, Document};
use crate::syntax::PatternRegistry;

/// One boundary found by [`step`], in bytes of the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Byte position where the delimiter text begins
    pub from: usize,
    /// Byte position of the boundary
    pub at: usize,
    /// Byte position scanning continues from
    pub next: usize,
    /// State after the boundary
    pub state: ScanState,
}

/// Find the next region boundary at or after byte `pos`.
///
/// Outside a region this is the start of the next region start match;
/// inside region `T` it is the end of the next match of `T`'s end
/// pattern.
pub fn step(registry: &PatternRegistry, text: &str, pos: usize, state: ScanState) -> Option<Step> {
    match state {
        ScanState::Outside => {
            let m = registry.find_syntax_start(text, pos)?;
            Some(Step {
                from: m.start,
                at: m.start,
                next: m.end,
                state: ScanState::Inside(m.id),
            })
        }
        ScanState::Inside(id) => {
            let (from, end) = registry.find_syntax_end(id, text, pos)?;
            Some(Step {
                from,
                at: end,
                next: end,
                state: ScanState::Outside,
            })
        }
    }
}

/// End of the text scanned for a window ending at the line start `end`.
///
/// One extra line is included so `$` and `\b` see what follows `end`
/// instead of an artificial end of text.
fn lookahead(doc: &dyn Document, end: usize) -> usize {
    let len = doc.len_chars();
    (doc.line_end(end.min(len)) + 1).min(len)
}

fn boundary(offset: usize, after: ScanState) -> Delimiter {
    match after {
        ScanState::Inside(id) => Delimiter::open(offset, id),
        ScanState::Outside => Delimiter::close(offset),
    }
}

/// What one call to [`Analyzer::build`] covered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Char range whose highlighting may have changed
    pub range: Range<usize>,
    /// Chars consumed, for batch sizing
    pub processed: usize,
    /// Whether the suffix of a saved table was spliced back
    pub spliced: bool,
}

/// Owner of the delimiter table and the saved suffix
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    table: DelimiterTable,
    saved: Option<SavedTable>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &DelimiterTable {
        &self.table
    }

    /// Whether a saved suffix is waiting to be reused
    pub fn has_saved(&self) -> bool {
        self.saved.is_some()
    }

    /// Forget everything and restart analysis from offset 0
    pub fn reset(&mut self) {
        self.table = DelimiterTable::new();
        self.saved = None;
    }

    /// Analyze from the resume point onwards.
    ///
    /// Stops at the end of the document, when a saved boundary is
    /// reproduced, or once `limit` chars have been consumed; the batch end
    /// is extended to the next line start so no match is split across
    /// batches. Returns `None` when there is nothing left to analyze.
    pub fn build(
        &mut self,
        registry: &PatternRegistry,
        doc: &dyn Document,
        limit: usize,
    ) -> Option<BuildReport> {
        let resume = self.table.resume?;
        let len = doc.len_chars();
        let start = resume.offset.min(len);

        if !registry.has_syntax() {
            self.table.resume = None;
            self.saved = None;
            return Some(BuildReport {
                range: start..len,
                processed: len - start,
                spliced: false,
            });
        }

        let end = doc.snap_forward((start + limit.max(1)).min(len));
        let ctx = doc.line_start(start);
        let text = doc.text(ctx..lookahead(doc, end));
        let end_byte = byte_of_char(&text, end - ctx);
        let mut counter = CharCounter::new(&text, ctx);
        let mut pos = byte_of_char(&text, start - ctx);
        let mut state = resume.state;

        while let Some(found) = step(registry, &text, pos, state) {
            // Matches beginning past the batch end belong to the next batch
            if end < len && found.from >= end_byte {
                break;
            }
            let offset = counter.char_offset(found.at);
            let delim = boundary(offset, found.state);
            self.table.entries.push(delim);
            pos = found.next;
            state = found.state;

            if self.splice(&delim) {
                log::debug!("reused saved delimiters from offset {offset}");
                return Some(BuildReport {
                    range: start..offset.max(start),
                    processed: offset.saturating_sub(start),
                    spliced: true,
                });
            }
        }

        // A match straddling the batch end moves the resume point past it
        let reached = counter.char_offset(pos).max(end);
        self.table.resume = if reached >= len {
            None
        } else {
            Some(Resume { offset: reached, state })
        };
        if self.table.resume.is_none() {
            self.saved = None;
        } else if let Some(saved) = &mut self.saved {
            saved.discard_before(reached);
            if saved.is_empty() {
                self.saved = None;
            }
        }

        Some(BuildReport {
            range: start..reached,
            processed: reached - start,
            spliced: false,
        })
    }

    /// Splice the saved suffix on if `delim` reproduces one of its entries
    fn splice(&mut self, delim: &Delimiter) -> bool {
        let Some(saved) = &mut self.saved else {
            return false;
        };
        saved.discard_before(delim.offset);
        let Some(idx) = saved.find(delim) else {
            if saved.is_empty() {
                self.saved = None;
            }
            return false;
        };
        let Some(saved) = self.saved.take() else {
            return false;
        };
        self.table.entries.extend_from_slice(&saved.entries[idx + 1..]);
        self.table.resume = saved.resume;
        true
    }

    /// Truncate the table for an edit at `from` of signed size `delta`,
    /// saving the suffix past the edit for reuse. Returns the offset
    /// analysis restarts from.
    pub fn invalidate(&mut self, doc: &dyn Document, from: usize, delta: isize) -> usize {
        let old_end = from + delta.min(0).unsigned_abs();
        let frontier = self.table.resume.map(|r| r.offset);

        match frontier {
            Some(r) if from >= r => {
                // Edit past the analyzed prefix: only the saved suffix moves
                self.saved = self.saved.take().and_then(|s| s.adjust(old_end, delta));
            }
            _ => {
                self.saved = SavedTable::capture(&self.table.entries, self.table.resume, old_end, delta);
            }
        }

        let cut = doc.line_start(from);
        let restart = match frontier {
            Some(r) if cut >= r => r,
            _ => self.table.truncate_at(cut),
        };
        log::debug!(
            "invalidate at {from} (delta {delta}): restart at {restart}, {} saved",
            self.saved.as_ref().map_or(0, |s| s.entries.len())
        );
        restart
    }

    /// Try to absorb an edit without truncating the table.
    ///
    /// Re-derives the boundaries from the last close before the edited
    /// line to the end of the last edited line, and compares them with
    /// the existing entries moved by `delta`. On an exact match the later
    /// entries are shifted and `true` is returned. A mismatch, a shorter
    /// run, an edit touching the text of a delimiter, or exceeding
    /// `budget` steps returns `false` with the table untouched; the caller
    /// then invalidates.
    pub fn update(
        &mut self,
        registry: &PatternRegistry,
        doc: &dyn Document,
        start: usize,
        delta: isize,
        budget: usize,
    ) -> bool {
        let old_end = start + delta.min(0).unsigned_abs();
        let new_end = start + delta.max(0).unsigned_abs();
        let len = doc.len_chars();
        let window_end = doc.snap_forward(doc.line_end(new_end));
        // On the last line every remaining boundary is inside the window
        let last_line = window_end >= len;

        if let Some(r) = self.table.resume {
            if r.offset <= old_end || shift(r.offset, delta) <= window_end {
                return false;
            }
        }

        let cut = doc.line_start(start);
        let mut first = locate_before(&self.table.entries, cut);
        while first > 0 && self.table.entries[first - 1].is_open() {
            first -= 1;
        }
        let restart = if first == 0 {
            0
        } else {
            self.table.entries[first - 1].offset
        };

        let mut expected = Vec::new();
        for d in &self.table.entries[first..] {
            let offset = if d.offset < start || (delta < 0 && d.offset == start) {
                d.offset
            } else if d.offset > old_end || (d.offset == old_end && (delta > 0 || d.is_open())) {
                shift(d.offset, delta)
            } else {
                // Boundary inside deleted text, or a close whose match
                // ended where the deletion did
                return false;
            };
            // A close at the window end may come from a match that
            // started inside the window
            if !last_line && (offset > window_end || (offset == window_end && d.is_open())) {
                break;
            }
            expected.push(Delimiter { offset, ..*d });
        }

        let ctx = doc.line_start(restart);
        let text = doc.text(ctx..lookahead(doc, window_end));
        let window_byte = byte_of_char(&text, window_end - ctx);
        let mut counter = CharCounter::new(&text, ctx);
        let mut pos = byte_of_char(&text, restart - ctx);
        let mut state = ScanState::Outside;
        let mut matched = 0;
        let mut steps = 0;

        loop {
            if steps == budget {
                log::debug!("update at {start}: step budget exhausted");
                return false;
            }
            steps += 1;
            let Some(found) = step(registry, &text, pos, state) else {
                break;
            };
            if !last_line && found.from >= window_byte {
                break;
            }
            let text_start = counter.char_offset(found.from);
            let delim = boundary(counter.char_offset(found.at), found.state);
            let text_end = counter.char_offset(found.next);
            if text_start <= new_end && text_end >= start {
                log::debug!("update at {start}: edit touches delimiter text at {text_start}");
                return false;
            }
            if expected.get(matched) != Some(&delim) {
                log::debug!("update at {start}: boundary mismatch at {}", delim.offset);
                return false;
            }
            matched += 1;
            pos = found.next;
            state = found.state;
        }
        if matched != expected.len() {
            log::debug!("update at {start}: {matched} of {} boundaries found", expected.len());
            return false;
        }

        self.table.entries[first..first + matched].copy_from_slice(&expected);
        self.table.shift_from(first + matched, delta);
        self.saved = self.saved.take().and_then(|s| s.adjust(old_end, delta));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use crate::syntax::{Grammar, LanguageManager, SyntaxId};

    fn registry() -> PatternRegistry {
        let mut grammar = Grammar::new("Test");
        grammar
            .add_syntax("comment", r"/\*", r"\*/", "comment")
            .add_syntax("string", "\"", "\"", "string")
            .set_escape(Some('\\'));
        PatternRegistry::new(&grammar)
    }

    fn build_all(analyzer: &mut Analyzer, registry: &PatternRegistry, doc: &TextDocument) {
        while analyzer.build(registry, doc, 16).is_some() {}
    }

    fn fresh(registry: &PatternRegistry, text: &str) -> Vec<Delimiter> {
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, registry, &TextDocument::new(text));
        analyzer.table().entries().to_vec()
    }

    #[test]
    fn test_step_states() {
        let registry = registry();
        let text = "a /* x */ b";
        let open = step(&registry, text, 0, ScanState::Outside).unwrap();
        assert_eq!(open.at, 2);
        assert_eq!(open.state, ScanState::Inside(SyntaxId(0)));
        let close = step(&registry, text, open.next, open.state).unwrap();
        assert_eq!(close.at, 9);
        assert_eq!(close.state, ScanState::Outside);
        assert!(step(&registry, text, close.next, close.state).is_none());
    }

    #[test]
    fn test_step_does_not_close_inside_start() {
        let registry = registry();
        // "/*/" must not close on its own slash
        let text = "/*/ x */";
        let open = step(&registry, text, 0, ScanState::Outside).unwrap();
        let close = step(&registry, text, open.next, open.state).unwrap();
        assert_eq!(close.at, 8);
    }

    #[test]
    fn test_build_batches_across_lines() {
        let registry = registry();
        let text = "x\n/* one\ntwo\nthree */ y\n\"s\"\n";
        let doc = TextDocument::new(text);
        let mut analyzer = Analyzer::new();

        let report = analyzer.build(&registry, &doc, 1).unwrap();
        assert_eq!(report.range, 0..2);
        assert!(!analyzer.table().is_complete());

        build_all(&mut analyzer, &registry, &doc);
        assert!(analyzer.table().is_complete());
        assert_eq!(
            analyzer.table().entries(),
            &[
                Delimiter::open(2, SyntaxId(0)),
                Delimiter::close(21),
                Delimiter::open(24, SyntaxId(1)),
                Delimiter::close(27),
            ]
        );
        assert_eq!(analyzer.table().entries(), fresh(&registry, text).as_slice());
    }

    #[test]
    fn test_build_unclosed_region() {
        let registry = registry();
        let doc = TextDocument::new("a /* never closed\nmore");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);
        assert_eq!(analyzer.table().entries(), &[Delimiter::open(2, SyntaxId(0))]);
    }

    #[test]
    fn test_update_fast_path_shifts() {
        let registry = registry();
        let mut doc = TextDocument::new("ab\n/* c */ \"s\"");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);
        let before = analyzer.table().entries().to_vec();

        doc.insert(1, "xyz");
        assert!(analyzer.update(&registry, &doc, 1, 3, 64));
        let after = analyzer.table().entries();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after) {
            assert_eq!(new.offset, old.offset + 3);
            assert_eq!(new.tag, old.tag);
            assert_eq!(new.depth, old.depth);
        }
    }

    #[test]
    fn test_update_inside_region() {
        let registry = registry();
        let mut doc = TextDocument::new("/* comment */ x\n\"str\"");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.insert(5, "more ");
        assert!(analyzer.update(&registry, &doc, 5, 5, 64));
        assert_eq!(analyzer.table().entries(), fresh(&registry, doc.as_str()).as_slice());
    }

    #[test]
    fn test_update_rejects_new_start() {
        let registry = registry();
        let mut doc = TextDocument::new("a /* x */ b");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.insert(2, "*");
        assert!(!analyzer.update(&registry, &doc, 2, 1, 64));
        // Table untouched on rejection
        assert_eq!(analyzer.table().entries()[1], Delimiter::close(9));
    }

    #[test]
    fn test_update_rejects_deleted_opener() {
        let registry = registry();
        let mut doc = TextDocument::new("a /* x */ b");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.delete(2..4);
        assert!(!analyzer.update(&registry, &doc, 2, -2, 64));
    }

    #[test]
    fn test_update_rejects_deleted_closer_at_end() {
        let registry = registry();
        let mut doc = TextDocument::new("a /* x */");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.delete(7..9);
        assert!(!analyzer.update(&registry, &doc, 7, -2, 64));
        assert_eq!(analyzer.table().entries()[1], Delimiter::close(9));
    }

    #[test]
    fn test_update_last_line_without_newline() {
        let registry = registry();
        let mut doc = TextDocument::new("x /* a */ y");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.insert(10, "z");
        assert!(analyzer.update(&registry, &doc, 10, 1, 64));
        assert_eq!(analyzer.table().entries(), fresh(&registry, doc.as_str()).as_slice());
    }

    #[test]
    fn test_build_independent_of_batch_size() {
        let c = LanguageManager::new().require_language("C").unwrap().clone();
        let registry = PatternRegistry::new(&c);
        // The continued comment's `$` must not match at a batch end
        let doc = TextDocument::new("// a \\\nb\nint x; /* c\nd */ \"s\\\"\" 'q'\n// e\n");

        let mut whole = Analyzer::new();
        while whole.build(&registry, &doc, 1_000_000).is_some() {}
        assert_eq!(whole.table().entries()[..2], [Delimiter::open(0, SyntaxId(0)), Delimiter::close(8)]);

        for limit in 1..8 {
            let mut batched = Analyzer::new();
            while batched.build(&registry, &doc, limit).is_some() {}
            assert_eq!(batched.table().entries(), whole.table().entries(), "batch size {limit}");
        }
    }

    #[test]
    fn test_update_budget() {
        let registry = registry();
        let mut doc = TextDocument::new("\"a\" \"b\" \"c\" x");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.insert(12, "y");
        assert!(!analyzer.update(&registry, &doc, 12, 1, 3));
        assert!(analyzer.update(&registry, &doc, 12, 1, 64));
    }

    #[test]
    fn test_invalidate_and_splice() {
        let registry = registry();
        let mut text = String::new();
        for i in 0..50 {
            text.push_str(&format!("line {i} /* c{i} */ \"s{i}\"\n"));
        }
        let mut doc = TextDocument::new(text);
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        doc.insert(0, "/* new */ ");
        let restart = analyzer.invalidate(&doc, 0, 10);
        assert_eq!(restart, 0);
        assert!(analyzer.has_saved());

        let report = analyzer.build(&registry, &doc, 1_000_000).unwrap();
        assert!(report.spliced);
        assert!(report.range.end < 60);
        assert!(analyzer.table().is_complete());
        assert!(!analyzer.has_saved());
        assert_eq!(analyzer.table().entries(), fresh(&registry, doc.as_str()).as_slice());
    }

    #[test]
    fn test_invalidate_deletion_reuses_suffix() {
        let registry = registry();
        let mut doc = TextDocument::new("/* a */ x\n/* b */ y\n/* c */ z\n");
        let mut analyzer = Analyzer::new();
        build_all(&mut analyzer, &registry, &doc);

        // Remove the second line's opener
        doc.delete(10..12);
        analyzer.invalidate(&doc, 10, -2);
        build_all(&mut analyzer, &registry, &doc);
        assert_eq!(analyzer.table().entries(), fresh(&registry, doc.as_str()).as_slice());
    }

    #[test]
    fn test_invalidate_past_frontier_keeps_prefix() {
        let registry = registry();
        let text = "/* a */\n".repeat(20);
        let mut doc = TextDocument::new(text);
        let mut analyzer = Analyzer::new();
        analyzer.build(&registry, &doc, 8);
        let frontier = analyzer.table().resume().unwrap().offset;
        let kept = analyzer.table().len();

        doc.insert(100, "\"");
        assert_eq!(analyzer.invalidate(&doc, 100, 1), frontier);
        assert_eq!(analyzer.table().len(), kept);

        build_all(&mut analyzer, &registry, &doc);
        assert_eq!(analyzer.table().entries(), fresh(&registry, doc.as_str()).as_slice());
    }
}
