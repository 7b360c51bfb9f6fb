//! Compiled pattern definitions
//!
//! Two kinds of definitions drive highlighting:
//! - [`SyntaxPatternDef`]: a start/end pair delimiting a region that may
//!   span lines (block comments, strings)
//! - [`PatternDef`]: a single regex for a flat token (numbers, keywords),
//!   only applied outside syntax regions

use std::fmt;

use regex::{Match, Regex, RegexBuilder};
use thiserror::Error;

use super::style::StyleId;
use crate::document::next_char_boundary;

/// Which regex of a definition failed to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPart {
    Start,
    End,
    Match,
}

impl fmt::Display for PatternPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternPart::Start => f.write_str("start"),
            PatternPart::End => f.write_str("end"),
            PatternPart::Match => f.write_str("match"),
        }
    }
}

/// A definition whose regex could not be compiled
#[derive(Error, Debug)]
#[error("pattern `{id}` has an invalid {part} regex: {source}")]
pub struct CompileError {
    pub id: String,
    pub part: PatternPart,
    #[source]
    pub source: regex::Error,
}

/// Compile a grammar regex. `^` and `$` match at line boundaries.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).build()
}

fn compile_part(id: &str, pattern: &str, part: PatternPart) -> Result<Regex, CompileError> {
    compile(pattern).map_err(|source| CompileError {
        id: id.to_string(),
        part,
        source,
    })
}

/// A nesting construct delimited by a start and an end regex
#[derive(Debug, Clone)]
pub struct SyntaxPatternDef {
    /// Name for debugging
    pub id: String,
    /// Pattern that opens the region
    pub start: Regex,
    /// Pattern that closes the region
    pub end: Regex,
    /// Style of the whole region
    pub style: StyleId,
}

impl SyntaxPatternDef {
    pub fn new(id: &str, start: &str, end: &str, style: StyleId) -> Result<Self, CompileError> {
        Ok(Self {
            id: id.to_string(),
            start: compile_part(id, start, PatternPart::Start)?,
            end: compile_part(id, end, PatternPart::End)?,
            style,
        })
    }
}

/// A flat, single-regex token
#[derive(Debug, Clone)]
pub struct PatternDef {
    /// Name for debugging
    pub id: String,
    /// Compiled regex pattern
    pub regex: Regex,
    /// Style to assign to matches
    pub style: StyleId,
}

impl PatternDef {
    pub fn new(id: &str, pattern: &str, style: StyleId) -> Result<Self, CompileError> {
        Ok(Self {
            id: id.to_string(),
            regex: compile_part(id, pattern, PatternPart::Match)?,
            style,
        })
    }
}

/// Find the first match of `search` at or after byte `from` that is not
/// escaped.
///
/// A match is escaped when an odd number of consecutive `escape` chars
/// immediately precede its start; the search then resumes one char past
/// the rejected match start.
pub fn find_next_unescaped<'t>(
    search: &Regex,
    text: &'t str,
    from: usize,
    escape: Option<char>,
) -> Option<Match<'t>> {
    let mut pos = from;
    while pos <= text.len() {
        let m = search.find_at(text, pos)?;
        match escape {
            Some(esc) if is_escaped(text, m.start(), esc) => {
                log::trace!("escaped match at byte {} rejected", m.start());
                pos = next_char_boundary(text, m.start());
            }
            _ => return Some(m),
        }
    }
    None
}

/// Whether the char at byte `pos` is preceded by an odd run of `escape`
pub fn is_escaped(text: &str, pos: usize, escape: char) -> bool {
    text[..pos].chars().rev().take_while(|&c| c == escape).count() % 2 == 1
}
