//! Sets of disjoint char ranges
//!
//! Used for the dirty and requested regions. Ranges are kept sorted,
//! non-empty, and merged when they touch.

use std::ops::Range;

/// A set of disjoint, merged `[start, end)` ranges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    ranges: Vec<Range<usize>>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Add a range, merging with any range it overlaps or touches
    pub fn add(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let first = self.ranges.partition_point(|r| r.end < range.start);
        let last = self.ranges.partition_point(|r| r.start <= range.end);
        if first == last {
            self.ranges.insert(first, range);
            return;
        }
        let start = range.start.min(self.ranges[first].start);
        let end = range.end.max(self.ranges[last - 1].end);
        self.ranges.splice(first..last, std::iter::once(start..end));
    }

    /// Remove a range, splitting any range it cuts through
    pub fn subtract(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.end <= range.start || r.start >= range.end {
                out.push(r);
                continue;
            }
            if r.start < range.start {
                out.push(r.start..range.start);
            }
            if r.end > range.end {
                out.push(range.end..r.end);
            }
        }
        self.ranges = out;
    }

    /// Parts of the set that fall inside `range`
    pub fn intersect(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let first = self.ranges.partition_point(|r| r.end <= range.start);
        self.ranges[first..]
            .iter()
            .take_while(|r| r.start < range.end)
            .map(|r| r.start.max(range.start)..r.end.min(range.end))
            .filter(|r| r.start < r.end)
            .collect()
    }

    /// Whether any part of `range` is in the set
    pub fn overlaps(&self, range: Range<usize>) -> bool {
        !self.intersect(range).is_empty()
    }

    /// Follow an insertion of `len` chars at `pos`
    pub fn adjust_for_insert(&mut self, pos: usize, len: usize) {
        for r in &mut self.ranges {
            if r.start >= pos {
                r.start += len;
                r.end += len;
            } else if r.end > pos {
                r.end += len;
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
        let old = std::mem::take(&mut self.ranges);
        for r in old {
            self.add(map(r.start)..map(r.end));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[Range<usize>]) -> RegionSet {
        let mut set = RegionSet::new();
        for r in ranges {
            set.add(r.clone());
        }
        set
    }

    #[test]
    fn test_add_merges() {
        let set = set(&[10..20, 30..40, 18..25, 25..28, 50..60]);
        assert_eq!(set.ranges(), &[10..28, 30..40, 50..60]);

        let mut set = set;
        set.add(0..100);
        assert_eq!(set.ranges(), &[0..100]);
    }

    #[test]
    fn test_add_ignores_empty() {
        let set = set(&[5..5, 7..3]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_subtract_splits() {
        let mut set = set(&[0..10, 20..30]);
        set.subtract(5..25);
        assert_eq!(set.ranges(), &[0..5, 25..30]);
        set.subtract(2..3);
        assert_eq!(set.ranges(), &[0..2, 3..5, 25..30]);
        set.subtract(0..100);
        assert!(set.is_empty());
    }

    #[test]
    fn test_intersect() {
        let set = set(&[0..10, 20..30, 40..50]);
        assert_eq!(set.intersect(5..25), vec![5..10, 20..25]);
        assert_eq!(set.intersect(10..20), Vec::<Range<usize>>::new());
        assert!(set.overlaps(45..100));
    }

    #[test]
    fn test_adjust_for_insert() {
        let mut set = set(&[0..10, 20..30]);
        set.adjust_for_insert(5, 3);
        assert_eq!(set.ranges(), &[0..13, 23..33]);
        set.adjust_for_insert(23, 2);
        assert_eq!(set.ranges(), &[0..13, 25..35]);
    }

    #[test]
    fn test_adjust_for_delete() {
        let mut spread = set(&[0..10, 20..30, 40..50]);
        spread.adjust_for_delete(5, 25);
        assert_eq!(spread.ranges(), &[0..10, 20..30]);

        let mut single = set(&[10..20]);
        single.adjust_for_delete(12, 15);
        assert_eq!(single.ranges(), &[10..17]);
        single.adjust_for_delete(0, 30);
        assert!(single.is_empty());
    }
}
