//! Document interface consumed by the engine
//!
//! All offsets are char (codepoint) indices. The engine only ever reads
//! through [`Document`]; edits reach it as notifications from whoever
//! owns the text (see [`crate::buffer::Buffer`]).

use std::borrow::Cow;
use std::ops::Range;

/// Read access to the text being highlighted
pub trait Document {
    /// Number of chars in the document
    fn len_chars(&self) -> usize;

    /// Text of a char range, clamped to the document
    fn text(&self, range: Range<usize>) -> Cow<'_, str>;

    /// Char at an offset
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Offset of the first char of the line containing `offset`
    fn line_start(&self, offset: usize) -> usize {
        let mut pos = offset.min(self.len_chars());
        while pos > 0 && self.char_at(pos - 1) != Some('\n') {
            pos -= 1;
        }
        pos
    }

    /// Offset of the newline ending the line containing `offset`
    /// (or the document length on the last line)
    fn line_end(&self, offset: usize) -> usize {
        let len = self.len_chars();
        let mut pos = offset.min(len);
        while pos < len && self.char_at(pos) != Some('\n') {
            pos += 1;
        }
        pos
    }

    /// Smallest line start at or after `offset` (or the document length)
    fn snap_forward(&self, offset: usize) -> usize {
        let len = self.len_chars();
        if offset == 0 || offset >= len || self.char_at(offset - 1) == Some('\n') {
            return offset.min(len);
        }
        (self.line_end(offset) + 1).min(len)
    }

    /// Grow a range to whole lines, including the trailing newline.
    ///
    /// The line containing `range.end` is always included, so an empty
    /// range covers its line.
    fn snap_to_lines(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len_chars();
        let start = self.line_start(range.start.min(len));
        let end = (self.line_end(range.end.max(range.start).min(len)) + 1).min(len);
        start..end.max(start)
    }
}

/// Chars between byte-offset checkpoints in [`TextDocument`]
const CHECKPOINT_STRIDE: usize = 64;

/// A string-backed document
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    /// The text content
    text: String,
    /// Byte offset of every `CHECKPOINT_STRIDE`th char
    checkpoints: Vec<usize>,
    /// Char count
    len: usize,
}

impl TextDocument {
    /// Create a document from a string
    pub fn new(text: impl Into<String>) -> Self {
        let mut doc = Self {
            text: text.into(),
            checkpoints: Vec::new(),
            len: 0,
        };
        doc.reindex();
        doc
    }

    /// Get the whole text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Insert text at a char offset, returning the number of chars inserted
    pub fn insert(&mut self, at: usize, text: &str) -> usize {
        let at = at.min(self.len);
        let byte = self.byte_offset(at);
        self.text.insert_str(byte, text);
        self.reindex();
        text.chars().count()
    }

    /// Delete a char range and return the deleted text
    pub fn delete(&mut self, range: Range<usize>) -> String {
        let start = self.byte_offset(range.start.min(self.len));
        let end = self.byte_offset(range.end.min(self.len));
        if start >= end {
            return String::new();
        }
        let removed: String = self.text.drain(start..end).collect();
        self.reindex();
        removed
    }

    /// Byte offset of a char offset (the text length when past the end)
    pub fn byte_offset(&self, offset: usize) -> usize {
        if offset >= self.len {
            return self.text.len();
        }
        let base = self.checkpoints[offset / CHECKPOINT_STRIDE];
        let skip = offset % CHECKPOINT_STRIDE;
        self.text[base..]
            .char_indices()
            .nth(skip)
            .map(|(b, _)| base + b)
            .unwrap_or(self.text.len())
    }

    /// Char offset of a byte offset (which must lie on a char boundary)
    pub fn char_offset(&self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        let idx = self.checkpoints.partition_point(|&b| b <= byte).saturating_sub(1);
        let base = self.checkpoints.get(idx).copied().unwrap_or(0);
        idx * CHECKPOINT_STRIDE + self.text[base..byte].chars().count()
    }

    fn reindex(&mut self) {
        self.checkpoints.clear();
        self.len = 0;
        for (byte, _) in self.text.char_indices() {
            if self.len % CHECKPOINT_STRIDE == 0 {
                self.checkpoints.push(byte);
            }
            self.len += 1;
        }
        if self.checkpoints.is_empty() {
            self.checkpoints.push(0);
        }
    }
}

impl Document for TextDocument {
    fn len_chars(&self) -> usize {
        self.len
    }

    fn text(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = self.byte_offset(range.start);
        let end = self.byte_offset(range.end.max(range.start));
        Cow::Borrowed(&self.text[start..end])
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len {
            return None;
        }
        self.text[self.byte_offset(offset)..].chars().next()
    }

    fn line_start(&self, offset: usize) -> usize {
        let byte = self.byte_offset(offset);
        match self.text[..byte].rfind('\n') {
            Some(nl) => self.char_offset(nl + 1),
            None => 0,
        }
    }

    fn line_end(&self, offset: usize) -> usize {
        let byte = self.byte_offset(offset);
        match self.text[byte..].find('\n') {
            Some(nl) => self.char_offset(byte + nl),
            None => self.len,
        }
    }
}

/// Converts byte offsets within a text slice into document char offsets.
///
/// Lookups are cheapest when made in increasing order.
pub(crate) struct CharCounter<'a> {
    text: &'a str,
    base: usize,
    byte: usize,
    chars: usize,
}

impl<'a> CharCounter<'a> {
    /// `base` is the document char offset of the slice's first char
    pub(crate) fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            base,
            byte: 0,
            chars: 0,
        }
    }

    pub(crate) fn char_offset(&mut self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.base + self.chars
    }
}

/// Byte offset of the `chars`th char of `text`
pub(crate) fn byte_of_char(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Byte offset of the char following the one at `byte`
pub(crate) fn next_char_boundary(text: &str, byte: usize) -> usize {
    text[byte..]
        .chars()
        .next()
        .map(|c| byte + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offsets_unicode() {
        let doc = TextDocument::new("héllo\nwörld");
        assert_eq!(doc.len_chars(), 11);
        assert_eq!(doc.char_at(1), Some('é'));
        assert_eq!(doc.text(6..11), "wörld");
        assert_eq!(doc.char_offset(doc.byte_offset(8)), 8);
    }

    #[test]
    fn test_checkpoints_long_text() {
        let text: String = "αβγ\n".repeat(100);
        let doc = TextDocument::new(text.clone());
        assert_eq!(doc.len_chars(), 400);
        assert_eq!(doc.char_at(201), Some('β'));
        assert_eq!(doc.text(396..400), "αβγ\n");
        for offset in [0, 63, 64, 65, 250, 399, 400] {
            assert_eq!(doc.char_offset(doc.byte_offset(offset)), offset);
        }
    }

    #[test]
    fn test_insert_and_delete() {
        let mut doc = TextDocument::new("abc");
        assert_eq!(doc.insert(1, "xy"), 2);
        assert_eq!(doc.as_str(), "axybc");
        assert_eq!(doc.delete(0..2), "ax");
        assert_eq!(doc.as_str(), "ybc");
        assert_eq!(doc.delete(2..2), "");
    }

    #[test]
    fn test_line_helpers() {
        let doc = TextDocument::new("ab\ncd\nef");
        assert_eq!(doc.line_start(4), 3);
        assert_eq!(doc.line_end(4), 5);
        assert_eq!(doc.line_end(7), 8);
        assert_eq!(doc.snap_forward(4), 6);
        assert_eq!(doc.snap_forward(3), 3);
        assert_eq!(doc.snap_to_lines(4..4), 3..6);
        assert_eq!(doc.snap_to_lines(1..7), 0..8);
    }

    #[test]
    fn test_default_line_helpers_match() {
        struct Plain(Vec<char>);
        impl Document for Plain {
            fn len_chars(&self) -> usize {
                self.0.len()
            }
            fn text(&self, range: Range<usize>) -> Cow<'_, str> {
                Cow::Owned(self.0[range].iter().collect())
            }
            fn char_at(&self, offset: usize) -> Option<char> {
                self.0.get(offset).copied()
            }
        }

        let text = "one\ntwo\n\nthree";
        let plain = Plain(text.chars().collect());
        let doc = TextDocument::new(text);
        for offset in 0..=text.len() {
            assert_eq!(plain.line_start(offset), doc.line_start(offset));
            assert_eq!(plain.line_end(offset), doc.line_end(offset));
        }
    }

    #[test]
    fn test_char_counter() {
        let text = "aé b";
        let mut counter = CharCounter::new(text, 10);
        assert_eq!(counter.char_offset(1), 11);
        assert_eq!(counter.char_offset(3), 12);
        assert_eq!(counter.char_offset(0), 10);
        assert_eq!(byte_of_char(text, 2), 3);
        assert_eq!(next_char_boundary(text, 1), 3);
    }
}
