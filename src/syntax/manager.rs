//! Language manager
//!
//! Keeps the known grammars by name and maps file extensions to them.

use std::collections::HashMap;
use std::path::Path;

use super::builtin;
use super::grammar::Grammar;
use crate::error::{HighlightError, Result};

/// Registry of named grammars
#[derive(Debug, Clone)]
pub struct LanguageManager {
    /// Loaded grammars
    languages: HashMap<String, Grammar>,
    /// Extension to language name mapping
    extension_map: HashMap<String, String>,
}

impl LanguageManager {
    /// Create a manager with the built-in grammars
    pub fn new() -> Self {
        let mut manager = Self::empty();
        for grammar in builtin::all_grammars() {
            manager.add_language(grammar);
        }
        manager
    }

    /// Create a manager with no grammars
    pub fn empty() -> Self {
        Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Add a grammar, replacing any grammar of the same name
    pub fn add_language(&mut self, grammar: Grammar) {
        let name = grammar.name.clone();
        if self.languages.contains_key(&name) {
            self.extension_map.retain(|_, lang| *lang != name);
        }
        for ext in &grammar.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        self.languages.insert(name, grammar);
    }

    /// Load a grammar file and add it, returning the language name
    pub fn load_grammar_file(&mut self, path: &Path) -> Result<String> {
        let grammar = Grammar::load(path)?;
        let name = grammar.name.clone();
        log::debug!("loaded grammar {name} from {}", path.display());
        self.add_language(grammar);
        Ok(name)
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// Get a grammar by name
    pub fn get_language(&self, name: &str) -> Option<&Grammar> {
        self.languages.get(name)
    }

    /// Get a grammar by name, or fail with [`HighlightError::UnknownLanguage`]
    pub fn require_language(&self, name: &str) -> Result<&Grammar> {
        self.get_language(name)
            .ok_or_else(|| HighlightError::UnknownLanguage(name.to_string()))
    }

    /// List available languages
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for LanguageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        let manager = LanguageManager::new();

        assert_eq!(manager.detect_language(Path::new("main.rs")), Some("Rust"));
        assert_eq!(manager.detect_language(Path::new("Cargo.toml")), Some("TOML"));
        assert_eq!(manager.detect_language(Path::new("main.c")), Some("C"));
        assert_eq!(manager.detect_language(Path::new("MAIN.CPP")), Some("C"));
        assert_eq!(manager.detect_language(Path::new("no_extension")), None);
        assert_eq!(manager.detect_language(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_list_languages() {
        let manager = LanguageManager::new();
        assert_eq!(manager.list_languages(), vec!["C", "Rust", "TOML"]);
    }

    #[test]
    fn test_replace_language() {
        let mut manager = LanguageManager::new();
        let mut grammar = Grammar::new("Rust");
        grammar.add_extension("rsx");
        manager.add_language(grammar);

        assert_eq!(manager.detect_language(Path::new("a.rsx")), Some("Rust"));
        assert_eq!(manager.detect_language(Path::new("a.rs")), None);
        assert!(manager.get_language("Rust").unwrap().syntax.is_empty());
    }

    #[test]
    fn test_unknown_language() {
        let manager = LanguageManager::new();
        assert!(matches!(
            manager.require_language("Cobol"),
            Err(HighlightError::UnknownLanguage(name)) if name == "Cobol"
        ));
    }
}
