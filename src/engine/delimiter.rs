//! Delimiter table
//!
//! The table is the persistent product of analysis: an ordered list of
//! the offsets where syntax regions open and close. It is kept as a flat
//! vector of small `Copy` records so truncating, shifting and splicing
//! are plain slice operations.

use crate::syntax::SyntaxId;

/// A region boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    /// Char offset of the boundary
    pub offset: usize,
    /// `Some(tag)` opens region `tag`; `None` closes the open region
    pub tag: Option<SyntaxId>,
    /// Number of regions open after this boundary
    pub depth: u32,
}

impl Delimiter {
    pub fn open(offset: usize, tag: SyntaxId) -> Self {
        Self {
            offset,
            tag: Some(tag),
            depth: 1,
        }
    }

    pub fn close(offset: usize) -> Self {
        Self {
            offset,
            tag: None,
            depth: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.tag.is_some()
    }

    /// Copy moved by a signed char delta
    pub(crate) fn shifted(self, delta: isize) -> Self {
        Self {
            offset: shift(self.offset, delta),
            ..self
        }
    }
}

/// Scanner state at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Outside,
    Inside(SyntaxId),
}

/// Where analysis continues from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resume {
    pub offset: usize,
    pub state: ScanState,
}

impl Resume {
    pub fn start() -> Self {
        Self {
            offset: 0,
            state: ScanState::Outside,
        }
    }
}

/// Number of delimiters with an offset at or before `offset`.
///
/// The delimiter governing `offset`, if any, sits just before the
/// returned index.
pub fn locate(table: &[Delimiter], offset: usize) -> usize {
    table.partition_point(|d| d.offset <= offset)
}

/// Number of delimiters strictly before `offset`
pub fn locate_before(table: &[Delimiter], offset: usize) -> usize {
    table.partition_point(|d| d.offset < offset)
}

/// Ordered region boundaries covering the analyzed prefix of a document
#[derive(Debug, Clone)]
pub struct DelimiterTable {
    pub(crate) entries: Vec<Delimiter>,
    /// `None` once the whole document has been analyzed
    pub(crate) resume: Option<Resume>,
}

impl DelimiterTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            resume: Some(Resume::start()),
        }
    }

    pub fn entries(&self) -> &[Delimiter] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resume(&self) -> Option<Resume> {
        self.resume
    }

    /// Whether analysis has reached the end of the document
    pub fn is_complete(&self) -> bool {
        self.resume.is_none()
    }

    /// Offset up to which the table is valid, `None` when complete
    pub fn last_offset(&self) -> Option<usize> {
        self.resume.map(|r| r.offset)
    }

    /// Region covering `offset`, judged by the last boundary at or before it
    pub fn region_at(&self, offset: usize) -> Option<SyntaxId> {
        match locate(&self.entries, offset) {
            0 => None,
            idx => self.entries[idx - 1].tag,
        }
    }

    /// Drop everything from `cut` on, then back off to the last close so
    /// analysis restarts in the Outside state. Returns the restart offset.
    pub(crate) fn truncate_at(&mut self, cut: usize) -> usize {
        let mut keep = locate_before(&self.entries, cut);
        while keep > 0 && self.entries[keep - 1].is_open() {
            keep -= 1;
        }
        self.entries.truncate(keep);
        let offset = self.entries.last().map_or(0, |d| d.offset);
        self.resume = Some(Resume {
            offset,
            state: ScanState::Outside,
        });
        offset
    }

    /// Move every entry from `index` on, and the resume point, by `delta`
    pub(crate) fn shift_from(&mut self, index: usize, delta: isize) {
        for d in &mut self.entries[index..] {
            *d = d.shifted(delta);
        }
        if let Some(resume) = &mut self.resume {
            resume.offset = shift(resume.offset, delta);
        }
    }
}

impl Default for DelimiterTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Suffix of an old table kept across an edit for reuse.
///
/// Entries are already in post-edit coordinates. Every entry lies past
/// the edited text, so once fresh analysis reproduces one of them the
/// rest can be spliced on unchanged.
#[derive(Debug, Clone)]
pub struct SavedTable {
    pub(crate) entries: Vec<Delimiter>,
    /// Resume point of the old table, in post-edit coordinates
    pub(crate) resume: Option<Resume>,
}

impl SavedTable {
    /// Keep the part of `entries` past an edit and move it into post-edit
    /// coordinates. `old_end` is the end of the edited text before the
    /// edit; entries at or before it are stale.
    pub(crate) fn capture(
        entries: &[Delimiter],
        resume: Option<Resume>,
        old_end: usize,
        delta: isize,
    ) -> Option<Self> {
        let resume = match resume {
            Some(r) if r.offset <= old_end => return None,
            Some(r) => Some(Resume {
                offset: shift(r.offset, delta),
                ..r
            }),
            None => None,
        };
        let from = locate(entries, old_end);
        if from == entries.len() {
            return None;
        }
        Some(Self {
            entries: entries[from..].iter().map(|d| d.shifted(delta)).collect(),
            resume,
        })
    }

    /// Apply a later edit to an already saved suffix
    pub(crate) fn adjust(self, old_end: usize, delta: isize) -> Option<Self> {
        Self::capture(&self.entries, self.resume, old_end, delta)
    }

    /// Drop entries that fresh analysis has already moved past
    pub(crate) fn discard_before(&mut self, offset: usize) {
        let n = locate_before(&self.entries, offset);
        self.entries.drain(..n);
    }

    /// Index of an entry equal to `delim`, if reuse can start there
    pub(crate) fn find(&self, delim: &Delimiter) -> Option<usize> {
        let from = locate_before(&self.entries, delim.offset);
        self.entries[from..]
            .iter()
            .take_while(|d| d.offset == delim.offset)
            .position(|d| d == delim)
            .map(|i| from + i)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn shift(offset: usize, delta: isize) -> usize {
    offset.saturating_add_signed(delta)
}
