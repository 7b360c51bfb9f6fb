//! Pattern registry
//!
//! Holds the compiled definitions of the active grammar. Syntax start
//! patterns are additionally merged into one alternation so the analyzer
//! can ask "is there any region start ahead" with a single scan, then
//! settle which definition matched by trying each start pattern at the
//! found position in declaration order.

use regex::Regex;

use super::grammar::Grammar;
use super::pattern::{compile, find_next_unescaped, PatternDef, SyntaxPatternDef};
use super::style::StyleId;
use crate::document::next_char_boundary;

/// Index of a syntax definition within the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxId(pub u16);

/// A region start found by [`PatternRegistry::find_syntax_start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartMatch {
    pub id: SyntaxId,
    /// Byte range of the start match
    pub start: usize,
    pub end: usize,
}

/// Compiled patterns of the active grammar
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    syntax: Vec<SyntaxPatternDef>,
    patterns: Vec<PatternDef>,
    merged_start: Option<Regex>,
    escape: Option<char>,
}

impl PatternRegistry {
    /// A registry with no definitions
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every definition of a grammar.
    ///
    /// Definitions that fail to compile, and syntax definitions whose
    /// start matches empty text, are logged and left out; the rest stay
    /// usable.
    pub fn new(grammar: &Grammar) -> Self {
        let mut registry = Self {
            escape: grammar.escape,
            ..Self::default()
        };

        for rule in &grammar.syntax {
            match SyntaxPatternDef::new(&rule.id, &rule.start, &rule.end, StyleId::new(&rule.style)) {
                Ok(def) if def.start.is_match("") => {
                    log::warn!("{}: syntax pattern `{}` has an empty start, dropped", grammar.name, def.id);
                }
                Ok(def) => registry.syntax.push(def),
                Err(err) => log::warn!("{}: {err}", grammar.name),
            }
        }
        if registry.syntax.len() > usize::from(u16::MAX) {
            log::warn!("{}: too many syntax definitions, extra ones ignored", grammar.name);
            registry.syntax.truncate(usize::from(u16::MAX));
        }

        for rule in &grammar.patterns {
            match PatternDef::new(&rule.id, &rule.pattern, StyleId::new(&rule.style)) {
                Ok(def) => registry.patterns.push(def),
                Err(err) => log::warn!("{}: {err}", grammar.name),
            }
        }

        registry.rebuild_merged();
        registry
    }

    /// Recompile the merged alternation of all start patterns
    fn rebuild_merged(&mut self) {
        if self.syntax.is_empty() {
            self.merged_start = None;
            return;
        }
        let source = self
            .syntax
            .iter()
            .map(|def| format!("(?:{})", def.start.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        self.merged_start = match compile(&source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                // Falls back to scanning each start pattern separately
                log::warn!("merged start pattern unavailable: {err}");
                None
            }
        };
    }

    /// Whether any region definitions exist
    pub fn has_syntax(&self) -> bool {
        !self.syntax.is_empty()
    }

    /// Get a syntax definition
    pub fn syntax(&self, id: SyntaxId) -> Option<&SyntaxPatternDef> {
        self.syntax.get(usize::from(id.0))
    }

    /// All syntax definitions, in declaration order
    pub fn syntax_defs(&self) -> &[SyntaxPatternDef] {
        &self.syntax
    }

    /// All flat definitions, in declaration order
    pub fn patterns(&self) -> &[PatternDef] {
        &self.patterns
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Find the next unescaped region start at or after byte `from`.
    ///
    /// When several start patterns match at the same position the one
    /// declared first wins. Zero-length starts are grammar errors and are
    /// skipped.
    pub fn find_syntax_start(&self, text: &str, from: usize) -> Option<StartMatch> {
        let mut pos = from;
        while pos <= text.len() {
            let at = self.next_candidate(text, pos)?;
            for (idx, def) in self.syntax.iter().enumerate() {
                let Some(m) = def.start.find_at(text, at) else {
                    continue;
                };
                if m.start() != at {
                    continue;
                }
                if m.is_empty() {
                    log::warn!("syntax pattern `{}` matched an empty start, ignored", def.id);
                    continue;
                }
                return Some(StartMatch {
                    id: SyntaxId(idx as u16),
                    start: m.start(),
                    end: m.end(),
                });
            }
            pos = next_char_boundary(text, at);
        }
        None
    }

    /// Byte position of the leftmost unescaped start candidate
    fn next_candidate(&self, text: &str, from: usize) -> Option<usize> {
        if let Some(merged) = &self.merged_start {
            return find_next_unescaped(merged, text, from, self.escape).map(|m| m.start());
        }
        self.syntax
            .iter()
            .filter_map(|def| find_next_unescaped(&def.start, text, from, self.escape))
            .map(|m| m.start())
            .min()
    }

    /// Find the next unescaped end of region `id` at or after byte `from`,
    /// returning its byte range
    pub fn find_syntax_end(&self, id: SyntaxId, text: &str, from: usize) -> Option<(usize, usize)> {
        let def = self.syntax(id)?;
        find_next_unescaped(&def.end, text, from, self.escape).map(|m| (m.start(), m.end()))
    }
}
