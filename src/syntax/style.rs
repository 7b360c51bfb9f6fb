//! Style identifiers, visual styles and style schemes
//!
//! The engine only ever deals in [`StyleId`]s. Resolving an id to colours
//! is the presenter's job, through a [`StyleScheme`] passed by reference.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of a style, as written in grammars (`"comment"`, `"string"`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(Arc<str>);

impl StyleId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StyleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A styled run of the document, in char offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Char offset where this span starts (inclusive)
    pub start: usize,
    /// Char offset where this span ends (exclusive)
    pub end: usize,
    /// Style to apply to this span
    pub style: StyleId,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, style: StyleId) -> Self {
        Self { start, end, style }
    }

    /// Check if this span contains a char position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this span in chars
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Maps style ids to visual styles
#[derive(Debug, Clone)]
pub struct StyleScheme {
    styles: HashMap<String, Style>,
}

impl StyleScheme {
    /// A scheme with no entries; everything resolves to the plain style
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Set the style for an id
    pub fn set(&mut self, id: &str, style: Style) {
        self.styles.insert(id.to_string(), style);
    }

    /// Resolve a style id
    pub fn resolve(&self, id: &StyleId) -> Style {
        self.styles.get(id.as_str()).copied().unwrap_or_default()
    }
}

impl Default for StyleScheme {
    fn default() -> Self {
        let mut scheme = Self::empty();
        scheme.set("comment", Style::fg(Color::BrightBlack).with_italic());
        scheme.set("string", Style::fg(Color::Green));
        scheme.set("char", Style::fg(Color::Green));
        scheme.set("escape", Style::fg(Color::BrightYellow));
        scheme.set("number", Style::fg(Color::Cyan));
        scheme.set("keyword", Style::fg(Color::Magenta).with_bold());
        scheme.set("type", Style::fg(Color::Yellow));
        scheme.set("preprocessor", Style::fg(Color::BrightMagenta));
        scheme.set("constant", Style::fg(Color::BrightRed));
        scheme.set("operator", Style::fg(Color::BrightWhite));
        scheme.set("attribute", Style::fg(Color::BrightBlue));
        scheme.set("macro", Style::fg(Color::BrightCyan));
        scheme.set("lifetime", Style::fg(Color::BrightYellow));
        scheme.set("section", Style::fg(Color::Blue).with_bold());
        scheme.set("key", Style::fg(Color::Yellow));
        scheme
    }
}
