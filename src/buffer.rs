//! Buffer: a document together with its highlighting engine
//!
//! The buffer owns the text and performs every edit itself, so the engine
//! hears about each insert and delete synchronously, right after the
//! text changes.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::document::{Document, TextDocument};
use crate::engine::Engine;
use crate::error::{HighlightError, Result};
use crate::syntax::{Grammar, LanguageManager, Span};

/// A highlighted text buffer
pub struct Buffer {
    /// The text content
    doc: TextDocument,
    /// Highlighting state for `doc`
    engine: Engine,
    /// Buffer name (e.g., "main.rs", "*scratch*")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
    /// Active language, if any
    language: Option<String>,
    /// Whether buffer has unsaved changes
    modified: bool,
}

impl Buffer {
    /// Create a new empty buffer with the given name
    pub fn new(name: impl Into<String>, config: EngineConfig) -> Self {
        Self::with_text(name, "", config)
    }

    /// Create a buffer holding `text`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            doc: TextDocument::new(text),
            engine: Engine::new(config),
            name: name.into(),
            filename: None,
            language: None,
            modified: false,
        }
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path, config: EngineConfig) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let mut buffer = Self::with_text(name, content, config);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Get the active language name
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Check if buffer is modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark buffer as modified
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Get the whole text
    pub fn text(&self) -> &str {
        self.doc.as_str()
    }

    /// Number of chars in the buffer
    pub fn len_chars(&self) -> usize {
        self.doc.len_chars()
    }

    pub fn document(&self) -> &TextDocument {
        &self.doc
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Switch to a named language from `manager`
    pub fn set_language(&mut self, manager: &LanguageManager, name: &str) -> Result<()> {
        let grammar = manager.require_language(name)?;
        self.set_grammar(grammar);
        Ok(())
    }

    /// Pick the language from the filename extension, if one matches
    pub fn detect_language(&mut self, manager: &LanguageManager) -> Option<&str> {
        let name = manager.detect_language(self.filename.as_deref()?)?;
        let grammar = manager.get_language(name)?;
        self.set_grammar(grammar);
        self.language.as_deref()
    }

    /// Highlight with an explicit grammar
    pub fn set_grammar(&mut self, grammar: &Grammar) {
        self.language = Some(grammar.name.clone());
        self.engine.set_grammar(&self.doc, grammar);
    }

    /// Insert text at a char offset
    pub fn insert(&mut self, at: usize, text: &str) {
        let at = at.min(self.doc.len_chars());
        if self.doc.insert(at, text) == 0 {
            return;
        }
        self.modified = true;
        self.engine.on_insert(&self.doc, at, text);
    }

    /// Delete a char range, returning the deleted text
    pub fn delete(&mut self, range: Range<usize>) -> String {
        let len = self.doc.len_chars();
        let range = range.start.min(len)..range.end.min(len);
        let removed = self.doc.delete(range.clone());
        if !removed.is_empty() {
            self.modified = true;
            self.engine.on_delete(&self.doc, range.start, range.end);
        }
        removed
    }

    /// Styled spans overlapping a char range
    pub fn highlight(&mut self, range: Range<usize>) -> Vec<Span> {
        self.engine.highlight(&self.doc, range)
    }

    /// Mark a range (typically the viewport) for background rendering
    pub fn request_region(&mut self, range: Range<usize>) {
        self.engine.request_region(range);
    }

    /// Run one background quantum; `true` while more work remains
    pub fn run_background(&mut self) -> bool {
        self.engine.run_background(&self.doc)
    }

    /// Drain all background work, returning the number of quanta run
    pub fn run_until_idle(&mut self) -> usize {
        let mut quanta = 0;
        while self.engine.has_pending_work() {
            quanta += 1;
            if !self.engine.run_background(&self.doc) {
                break;
            }
        }
        quanta
    }

    /// Bracket matching the one before `pos`, within the configured distance
    pub fn matching_bracket(&mut self, pos: usize) -> Option<usize> {
        let limit = self.engine.config().bracket_match_limit;
        self.engine.find_matching_bracket(&self.doc, pos, Some(limit))
    }

    /// Bracket matching the one before `pos`, however far away
    pub fn jump_to_bracket(&mut self, pos: usize) -> Option<usize> {
        self.engine.find_matching_bracket(&self.doc, pos, None)
    }

    /// Turn highlighting on or off
    pub fn set_highlighting(&mut self, enabled: bool) {
        self.engine.set_enabled(&self.doc, enabled);
    }

    /// Write buffer to its file
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .filename
            .clone()
            .ok_or_else(|| HighlightError::Message("No filename set".to_string()))?;
        self.write_to(&path)?;
        self.modified = false;
        Ok(())
    }

    /// Write buffer to specific path
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.doc.as_str())?;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("*scratch*", EngineConfig::default())
    }
}
