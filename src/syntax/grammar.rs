//! Grammar definitions
//!
//! A [`Grammar`] is the uncompiled description of a language: an ordered
//! list of syntax (start/end) rules, an ordered list of flat pattern rules
//! and an optional escape char. Grammars come from the built-in set or
//! from TOML files:
//!
//! ```toml
//! name = "C"
//! extensions = ["c", "h"]
//! escape = "\\"
//!
//! [[syntax]]
//! id = "block-comment"
//! start = '/\*'
//! end = '\*/'
//! style = "comment"
//!
//! [[pattern]]
//! id = "number"
//! match = '\b[0-9]+\b'
//! style = "number"
//! ```

use std::fs;
use std::path::Path;

use toml::{Table, Value};

use super::pattern::{PatternDef, SyntaxPatternDef};
use super::style::StyleId;
use crate::error::{HighlightError, Result};

/// A start/end rule for a region that may span lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxRule {
    pub id: String,
    pub start: String,
    pub end: String,
    pub style: String,
}

/// A single-regex rule for a flat token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub id: String,
    pub pattern: String,
    pub style: String,
}

/// A complete language definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    /// Language name (e.g., "Rust", "C")
    pub name: String,
    /// File extensions (e.g., ["rs"], ["c", "h"])
    pub extensions: Vec<String>,
    /// Region rules, in declaration order
    pub syntax: Vec<SyntaxRule>,
    /// Flat token rules, in declaration order
    pub patterns: Vec<PatternRule>,
    /// Char whose odd-count run before a match suppresses it
    pub escape: Option<char>,
}

impl Grammar {
    /// Create a new empty grammar
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) -> &mut Self {
        self.extensions.push(ext.to_string());
        self
    }

    /// Add a region rule
    pub fn add_syntax(&mut self, id: &str, start: &str, end: &str, style: &str) -> &mut Self {
        self.syntax.push(SyntaxRule {
            id: id.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            style: style.to_string(),
        });
        self
    }

    /// Add a flat token rule
    pub fn add_pattern(&mut self, id: &str, pattern: &str, style: &str) -> &mut Self {
        self.patterns.push(PatternRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            style: style.to_string(),
        });
        self
    }

    /// Set the escape char
    pub fn set_escape(&mut self, escape: Option<char>) -> &mut Self {
        self.escape = escape;
        self
    }

    /// Compile every rule, failing on the first invalid regex.
    ///
    /// The engine itself drops invalid rules with a warning; this is for
    /// checking a grammar file up front.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.syntax {
            SyntaxPatternDef::new(&rule.id, &rule.start, &rule.end, StyleId::new(&rule.style))?;
        }
        for rule in &self.patterns {
            PatternDef::new(&rule.id, &rule.pattern, StyleId::new(&rule.style))?;
        }
        Ok(())
    }

    /// Load a grammar from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a grammar from TOML source
    pub fn from_toml(contents: &str) -> Result<Self> {
        let table: Table = contents.parse()?;

        let name = required_str(&table, "name", "grammar")?;
        let mut grammar = Grammar::new(&name);

        if let Some(exts) = table.get("extensions") {
            let exts = exts
                .as_array()
                .ok_or_else(|| invalid("`extensions` must be an array of strings"))?;
            for ext in exts {
                let ext = ext
                    .as_str()
                    .ok_or_else(|| invalid("`extensions` must be an array of strings"))?;
                grammar.add_extension(ext);
            }
        }

        grammar.escape = match table.get("escape") {
            None => None,
            Some(Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => None,
                    (Some(c), None) => Some(c),
                    _ => return Err(invalid("`escape` must be a single character")),
                }
            }
            Some(_) => return Err(invalid("`escape` must be a string")),
        };

        for entry in entries(&table, "syntax")? {
            let id = required_str(entry, "id", "[[syntax]]")?;
            grammar.add_syntax(
                &id,
                &required_str(entry, "start", &id)?,
                &required_str(entry, "end", &id)?,
                &required_str(entry, "style", &id)?,
            );
        }

        for entry in entries(&table, "pattern")? {
            let id = required_str(entry, "id", "[[pattern]]")?;
            grammar.add_pattern(
                &id,
                &required_str(entry, "match", &id)?,
                &required_str(entry, "style", &id)?,
            );
        }

        Ok(grammar)
    }
}

fn invalid(msg: &str) -> HighlightError {
    HighlightError::Grammar(msg.to_string())
}

fn required_str(table: &Table, key: &str, context: &str) -> Result<String> {
    match table.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(HighlightError::Grammar(format!(
            "`{key}` in {context} must be a string"
        ))),
        None => Err(HighlightError::Grammar(format!(
            "missing `{key}` in {context}"
        ))),
    }
}

fn entries<'a>(table: &'a Table, key: &str) -> Result<Vec<&'a Table>> {
    let Some(value) = table.get(key) else {
        return Ok(Vec::new());
    };
    let array = value
        .as_array()
        .ok_or_else(|| HighlightError::Grammar(format!("`{key}` must be an array of tables")))?;
    array
        .iter()
        .map(|v| {
            v.as_table()
                .ok_or_else(|| HighlightError::Grammar(format!("`{key}` must be an array of tables")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name = "Mini"
extensions = ["mini", "mn"]
escape = "\\"

[[syntax]]
id = "comment"
start = '/\*'
end = '\*/'
style = "comment"

[[syntax]]
id = "string"
start = '"'
end = '"'
style = "string"

[[pattern]]
id = "number"
match = '\b[0-9]+\b'
style = "number"
"#;

    #[test]
    fn test_from_toml() {
        let grammar = Grammar::from_toml(SAMPLE).unwrap();
        assert_eq!(grammar.name, "Mini");
        assert_eq!(grammar.extensions, vec!["mini", "mn"]);
        assert_eq!(grammar.escape, Some('\\'));
        assert_eq!(grammar.syntax.len(), 2);
        assert_eq!(grammar.syntax[0].id, "comment");
        assert_eq!(grammar.syntax[1].start, "\"");
        assert_eq!(grammar.patterns[0].pattern, r"\b[0-9]+\b");
    }

    #[test]
    fn test_empty_escape_disables() {
        let grammar = Grammar::from_toml("name = \"X\"\nescape = \"\"\n").unwrap();
        assert_eq!(grammar.escape, None);
        assert!(grammar.syntax.is_empty());
    }

    #[test]
    fn test_missing_name() {
        let err = Grammar::from_toml("extensions = []").unwrap_err();
        assert!(matches!(err, HighlightError::Grammar(_)));
    }

    #[test]
    fn test_missing_end() {
        let src = "name = \"X\"\n[[syntax]]\nid = \"c\"\nstart = 'a'\nstyle = \"comment\"\n";
        let err = Grammar::from_toml(src).unwrap_err();
        assert!(err.to_string().contains("missing `end`"));
    }

    #[test]
    fn test_bad_toml() {
        let err = Grammar::from_toml("name = ").unwrap_err();
        assert!(matches!(err, HighlightError::Toml(_)));
    }

    #[test]
    fn test_validate() {
        assert!(Grammar::from_toml(SAMPLE).unwrap().validate().is_ok());

        let mut grammar = Grammar::new("Bad");
        grammar.add_pattern("number", "[0-9", "number");
        let err = grammar.validate().unwrap_err();
        assert!(matches!(err, HighlightError::Pattern(ref e) if e.id == "number"));
    }

    #[test]
    fn test_builder() {
        let mut grammar = Grammar::new("B");
        grammar
            .add_extension("b")
            .add_syntax("c", "#", "$", "comment")
            .set_escape(Some('\\'));
        assert_eq!(grammar.syntax[0].end, "$");
        assert_eq!(grammar.escape, Some('\\'));
    }
}
