//! Highlight region tracking
//!
//! Two region sets drive lazy rendering: `dirty` holds ranges whose
//! spans are stale, `requested` holds ranges a view wants kept up to date
//! (typically the visible viewport). A dirty range is rendered at most
//! once until an edit dirties it again.

use std::ops::Range;

use super::regions::RegionSet;

#[derive(Debug, Clone, Default)]
pub struct HighlightTracker {
    dirty: RegionSet,
    requested: RegionSet,
    renders: usize,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dirty(&self) -> &RegionSet {
        &self.dirty
    }

    pub fn requested(&self) -> &RegionSet {
        &self.requested
    }

    /// Number of render passes run so far
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn mark_dirty(&mut self, range: Range<usize>) {
        self.dirty.add(range);
    }

    pub fn request(&mut self, range: Range<usize>) {
        self.requested.add(range);
    }

    pub fn clear_requested(&mut self) {
        self.requested.clear();
    }

    /// Forget all stale ranges
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Dirty ranges inside the requested set
    pub fn pending_requested(&self) -> Vec<Range<usize>> {
        self.requested
            .ranges()
            .iter()
            .flat_map(|r| self.dirty.intersect(r.clone()))
            .collect()
    }

    /// Render every dirty part of `range` with `render`, then mark it
    /// clean. `render` returns the range it actually covered, which may
    /// be wider than the one it was given; that is marked clean too.
    /// Returns the number of subranges rendered.
    pub fn ensure_highlighted(
        &mut self,
        range: Range<usize>,
        mut render: impl FnMut(Range<usize>) -> Range<usize>,
    ) -> usize {
        let mut count = 0;
        for sub in self.dirty.intersect(range) {
            // An earlier, wider render may already have covered it
            if !self.dirty.overlaps(sub.clone()) {
                continue;
            }
            let covered = render(sub.clone());
            self.dirty.subtract(sub);
            self.dirty.subtract(covered);
            self.renders += 1;
            count += 1;
        }
        count
    }

    pub fn adjust_for_insert(&mut self, pos: usize, len: usize) {
        self.dirty.adjust_for_insert(pos, len);
        self.requested.adjust_for_insert(pos, len);
    }

    pub fn adjust_for_delete(&mut self, start: usize, end: usize) {
        self.dirty.adjust_for_delete(start, end);
        self.requested.adjust_for_delete(start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_highlighted_renders_once() {
        let mut tracker = HighlightTracker::new();
        tracker.mark_dirty(0..50);

        let mut rendered = Vec::new();
        let mut render = |r: Range<usize>| {
            rendered.push(r.clone());
            r
        };
        assert_eq!(tracker.ensure_highlighted(10..20, &mut render), 1);
        assert_eq!(tracker.ensure_highlighted(10..20, &mut render), 0);
        assert_eq!(rendered, vec![10..20]);
        assert_eq!(tracker.dirty().ranges(), &[0..10, 20..50]);
        assert_eq!(tracker.render_count(), 1);
    }

    #[test]
    fn test_ensure_highlighted_splits_around_clean() {
        let mut tracker = HighlightTracker::new();
        tracker.mark_dirty(0..10);
        tracker.mark_dirty(20..30);
        let mut rendered = Vec::new();
        tracker.ensure_highlighted(0..100, |r| {
            rendered.push(r.clone());
            r
        });
        assert_eq!(rendered, vec![0..10, 20..30]);
        assert!(tracker.dirty().is_empty());
    }

    #[test]
    fn test_wider_render_clears_more() {
        let mut tracker = HighlightTracker::new();
        tracker.mark_dirty(0..10);
        tracker.mark_dirty(20..30);
        tracker.mark_dirty(50..60);
        // The first render reaches over the second dirty range
        let mut rendered = Vec::new();
        let count = tracker.ensure_highlighted(0..40, |r| {
            rendered.push(r.clone());
            r.start..35
        });
        assert_eq!(count, 1);
        assert_eq!(rendered, vec![0..10]);
        assert_eq!(tracker.dirty().ranges(), &[50..60]);
    }

    #[test]
    fn test_pending_requested() {
        let mut tracker = HighlightTracker::new();
        tracker.mark_dirty(0..100);
        tracker.request(40..60);
        assert_eq!(tracker.pending_requested(), vec![40..60]);
        tracker.ensure_highlighted(40..60, |r| r);
        assert!(tracker.pending_requested().is_empty());
    }

    #[test]
    fn test_edits_move_both_sets() {
        let mut tracker = HighlightTracker::new();
        tracker.mark_dirty(10..20);
        tracker.request(30..40);
        tracker.adjust_for_insert(0, 5);
        assert_eq!(tracker.dirty().ranges(), &[15..25]);
        assert_eq!(tracker.requested().ranges(), &[35..45]);
        tracker.adjust_for_delete(0, 10);
        assert_eq!(tracker.dirty().ranges(), &[5..15]);
    }
}
