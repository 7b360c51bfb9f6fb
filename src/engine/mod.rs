//! Incremental highlighting engine
//!
//! [`Engine`] ties the pieces together for one document: the analyzer
//! keeps the delimiter table in step with edits, the tracker records
//! which ranges need rendering, the scheduler paces background analysis
//! and the span store holds what has been rendered so far.
//!
//! The document owner calls [`Engine::on_insert`] / [`Engine::on_delete`]
//! right after mutating the text. The table and dirty set are consistent
//! with the edit by the time those return.

pub mod analyzer;
pub mod delimiter;
pub mod flat;
pub mod regions;
pub mod scheduler;
pub mod spans;
pub mod tracker;

use std::ops::Range;
use std::time::Instant;

use crate::bracket;
use crate::config::EngineConfig;
use crate::document::{byte_of_char, CharCounter, Document};
use crate::syntax::{Grammar, PatternRegistry, Span};

pub use analyzer::{Analyzer, BuildReport};
pub use delimiter::{Delimiter, DelimiterTable, Resume, ScanState};
pub use flat::{search_patterns, FlatMatch};
pub use regions::RegionSet;
pub use scheduler::Scheduler;
pub use spans::SpanStore;
pub use tracker::HighlightTracker;

/// Highlight-updated callback, called with the char range that changed
pub type HighlightCallback = Box<dyn FnMut(Range<usize>)>;

/// Handle returned by [`Engine::connect_highlight_updated`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Highlighting state for one document
pub struct Engine {
    config: EngineConfig,
    registry: PatternRegistry,
    analyzer: Analyzer,
    tracker: HighlightTracker,
    spans: SpanStore,
    scheduler: Scheduler,
    listeners: Vec<(ListenerId, HighlightCallback)>,
    next_listener: u64,
    enabled: bool,
}

impl Engine {
    /// An engine with no grammar
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: PatternRegistry::empty(),
            analyzer: Analyzer::new(),
            tracker: HighlightTracker::new(),
            spans: SpanStore::new(),
            scheduler: Scheduler::new(&config),
            listeners: Vec::new(),
            next_listener: 0,
            enabled: config.highlight,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Switch to a new grammar and rebuild from scratch
    pub fn set_grammar(&mut self, doc: &dyn Document, grammar: &Grammar) {
        self.registry = PatternRegistry::new(grammar);
        log::debug!(
            "grammar {}: {} syntax, {} flat definitions",
            grammar.name,
            self.registry.syntax_defs().len(),
            self.registry.patterns().len()
        );
        self.rebuild(doc);
    }

    /// Drop all analysis and rendering, and start over
    fn rebuild(&mut self, doc: &dyn Document) {
        let len = doc.len_chars();
        self.analyzer.reset();
        self.spans.clear();
        self.tracker.clear_dirty();
        if self.enabled {
            self.tracker.mark_dirty(0..len);
            self.scheduler.arm();
        }
        self.notify(0..len);
    }

    /// The document gained `text` at char offset `at`
    pub fn on_insert(&mut self, doc: &dyn Document, at: usize, text: &str) {
        let len = text.chars().count();
        if len == 0 {
            return;
        }
        self.tracker.adjust_for_insert(at, len);
        self.spans.adjust_for_insert(at, len);
        self.apply_edit(doc, at, len as isize);
    }

    /// The document lost the chars in `[start, end)`
    pub fn on_delete(&mut self, doc: &dyn Document, start: usize, end: usize) {
        if end <= start {
            return;
        }
        self.tracker.adjust_for_delete(start, end);
        self.spans.adjust_for_delete(start, end);
        self.apply_edit(doc, start, -((end - start) as isize));
    }

    fn apply_edit(&mut self, doc: &dyn Document, at: usize, delta: isize) {
        if !self.enabled {
            return;
        }
        if self.registry.has_syntax() {
            let budget = self.config.update_step_budget;
            if self.analyzer.update(&self.registry, doc, at, delta, budget) {
                log::debug!("edit at {at} (delta {delta}) absorbed by the fast path");
            } else {
                self.analyzer.invalidate(doc, at, delta);
                self.scheduler.arm();
            }
        }

        let new_end = at + delta.max(0).unsigned_abs();
        let lines = doc.snap_to_lines(at..new_end);
        self.tracker.mark_dirty(lines.clone());
        self.notify(lines);
    }

    /// Analyze until the table is valid up to `upto`
    fn ensure_analyzed(&mut self, doc: &dyn Document, upto: usize) {
        while let Some(resume) = self.analyzer.table().resume() {
            if resume.offset >= upto {
                break;
            }
            let batch = self.scheduler.batch_size();
            let Some(report) = self.analyzer.build(&self.registry, doc, batch) else {
                break;
            };
            self.analyzed(doc, report.range);
        }
    }

    /// Freshly analyzed text needs rendering again
    fn analyzed(&mut self, doc: &dyn Document, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let lines = doc.snap_to_lines(range);
        self.tracker.mark_dirty(lines.clone());
        self.notify(lines);
    }

    /// Styled spans overlapping `range`, rendering whatever is stale
    pub fn highlight(&mut self, doc: &dyn Document, range: Range<usize>) -> Vec<Span> {
        if !self.enabled {
            return Vec::new();
        }
        let len = doc.len_chars();
        let range = range.start.min(len)..range.end.min(len);
        self.ensure_highlighted(doc, doc.snap_to_lines(range.clone()));
        self.spans.query(range)
    }

    /// Make sure every span inside `range` is up to date
    pub fn ensure_highlighted(&mut self, doc: &dyn Document, range: Range<usize>) {
        if !self.enabled {
            return;
        }
        self.ensure_analyzed(doc, range.end);
        self.render_dirty(doc, range);
    }

    /// Render the dirty parts of an already analyzed range
    fn render_dirty(&mut self, doc: &dyn Document, range: Range<usize>) {
        let Self {
            registry,
            analyzer,
            tracker,
            spans,
            ..
        } = self;
        let table = analyzer.table();
        let frontier = table.resume().map_or(doc.len_chars(), |r| r.offset);
        tracker.ensure_highlighted(range, |sub| {
            let lines = doc.snap_to_lines(sub.clone());
            let lines = lines.start..lines.end.min(frontier).max(sub.end);
            let covered = widen_to_regions(table.entries(), lines, frontier);
            let rendered = render(registry, table, doc, covered.clone());
            spans.replace(covered.clone(), rendered);
            covered
        });
    }

    /// Add a range views want kept highlighted by background work
    pub fn request_region(&mut self, range: Range<usize>) {
        self.tracker.request(range);
    }

    pub fn clear_requested(&mut self) {
        self.tracker.clear_requested();
    }

    pub fn requested_regions(&self) -> &RegionSet {
        self.tracker.requested()
    }

    pub fn dirty_regions(&self) -> &RegionSet {
        self.tracker.dirty()
    }

    /// Run one background quantum.
    ///
    /// Analyzes one batch, then renders the dirty parts of the requested
    /// regions that analysis has reached. Returns `true` while more work
    /// remains.
    pub fn run_background(&mut self, doc: &dyn Document) -> bool {
        if !self.enabled {
            return false;
        }

        if self.scheduler.is_armed() {
            let started = Instant::now();
            let batch = self.scheduler.batch_size();
            let report = self.analyzer.build(&self.registry, doc, batch);
            self.scheduler.record(
                report.as_ref().map_or(0, |r| r.processed),
                started.elapsed(),
            );
            if let Some(report) = report {
                self.analyzed(doc, report.range);
            }
            if self.analyzer.table().is_complete() {
                self.scheduler.cancel();
            }
        }

        let frontier = self
            .analyzer
            .table()
            .resume()
            .map_or(doc.len_chars(), |r| r.offset);
        for range in self.tracker.pending_requested() {
            let end = range.end.min(frontier);
            if range.start < end {
                self.render_dirty(doc, range.start..end);
            }
        }

        self.has_pending_work()
    }

    /// Whether background work is scheduled
    pub fn has_pending_work(&self) -> bool {
        self.enabled && (self.scheduler.is_armed() || !self.tracker.pending_requested().is_empty())
    }

    /// Turn highlighting on or off.
    ///
    /// Disabling cancels background work and drops all spans; enabling
    /// rebuilds from scratch.
    pub fn set_enabled(&mut self, doc: &dyn Document, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.rebuild(doc);
        } else {
            self.scheduler.cancel();
            self.spans.clear();
            self.tracker.clear_dirty();
            self.notify(0..doc.len_chars());
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Offset of the bracket matching the one before `pos`.
    ///
    /// Brackets inside a different syntax region than the origin are
    /// skipped. `limit` caps the scan distance.
    pub fn find_matching_bracket(
        &mut self,
        doc: &dyn Document,
        pos: usize,
        limit: Option<usize>,
    ) -> Option<usize> {
        if !self.enabled || !self.registry.has_syntax() {
            return bracket::find_matching_bracket(doc, pos, limit, |_| None);
        }
        let len = doc.len_chars();
        self.ensure_analyzed(doc, limit.map_or(len, |l| pos.saturating_add(l).min(len)));
        let table = self.analyzer.table();
        bracket::find_matching_bracket(doc, pos, limit, |offset| table.region_at(offset))
    }

    /// Register a callback for ranges whose highlighting may have changed
    pub fn connect_highlight_updated(
        &mut self,
        callback: impl FnMut(Range<usize>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback, returning whether it was registered
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, range: Range<usize>) {
        for (_, callback) in &mut self.listeners {
            callback(range.clone());
        }
    }

    /// The delimiter table as analyzed so far
    pub fn delimiters(&self) -> &DelimiterTable {
        self.analyzer.table()
    }

    /// Number of render passes run so far
    pub fn render_count(&self) -> usize {
        self.tracker.render_count()
    }
}

/// Grow `range` so it neither starts nor ends inside a region.
///
/// A region is always rendered as one span, from its open to its close
/// (or to `limit` while the close is not known yet).
fn widen_to_regions(entries: &[Delimiter], range: Range<usize>, limit: usize) -> Range<usize> {
    let mut start = range.start;
    if let Some(open) = delimiter::locate(entries, start)
        .checked_sub(1)
        .map(|i| entries[i])
        .filter(Delimiter::is_open)
    {
        start = open.offset;
    }

    let mut end = range.end;
    if end > range.start {
        let idx = delimiter::locate(entries, end - 1);
        if idx > 0 && entries[idx - 1].is_open() {
            end = entries.get(idx).map_or(limit, |close| close.offset);
        }
    }
    start..end.min(limit).max(range.end)
}

/// Compute the spans of `range` from the table and the flat patterns
fn render(
    registry: &PatternRegistry,
    table: &DelimiterTable,
    doc: &dyn Document,
    range: Range<usize>,
) -> Vec<Span> {
    let entries = table.entries();
    let mut idx = delimiter::locate(entries, range.start);
    let mut region = idx.checked_sub(1).and_then(|i| entries[i].tag);
    let mut pos = range.start;
    let mut spans = Vec::new();

    while pos < range.end {
        let next = entries
            .get(idx)
            .map_or(range.end, |d| d.offset.min(range.end));
        if next > pos {
            match region.and_then(|id| registry.syntax(id)) {
                Some(def) => spans.push(Span::new(pos, next, def.style.clone())),
                None => render_flat(registry, doc, pos..next, &mut spans),
            }
            pos = next;
        }
        match entries.get(idx) {
            Some(d) if d.offset <= pos => {
                region = d.tag;
                idx += 1;
            }
            _ => break,
        }
    }

    spans
}

/// Flat pattern spans for text outside any region
fn render_flat(
    registry: &PatternRegistry,
    doc: &dyn Document,
    range: Range<usize>,
    spans: &mut Vec<Span>,
) {
    let patterns = registry.patterns();
    if patterns.is_empty() {
        return;
    }
    let ctx = doc.line_start(range.start);
    let text = doc.text(ctx..range.end);
    let from = byte_of_char(&text, range.start - ctx);
    let mut counter = CharCounter::new(&text, ctx);
    for m in search_patterns(patterns, &text, from) {
        let start = counter.char_offset(m.start);
        let end = counter.char_offset(m.end);
        spans.push(Span::new(start, end, patterns[m.pattern].style.clone()));
    }
}
