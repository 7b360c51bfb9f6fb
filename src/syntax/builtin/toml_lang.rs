//! TOML grammar

use crate::syntax::grammar::Grammar;

/// Create the TOML grammar
pub fn toml_grammar() -> Grammar {
    let mut grammar = Grammar::new("TOML");
    grammar.add_extension("toml").set_escape(Some('\\'));

    // Regions; the triple-quoted forms must be declared first
    grammar.add_syntax("comment", "#", "$", "comment");
    grammar.add_syntax("multiline-basic", r#"""""#, r#"""""#, "string");
    grammar.add_syntax("multiline-literal", "'''", "'''", "string");
    grammar.add_syntax("basic-string", "\"", "\"", "string");
    grammar.add_syntax("literal-string", "'", "'", "string");

    // Flat patterns

    // Table headers
    grammar.add_pattern("table", r"^[ \t]*\[\[?[^\]\n]+\]\]?", "section");

    // Booleans
    grammar.add_pattern("boolean", r"\b(?:true|false)\b", "constant");

    // Dates/times
    grammar.add_pattern(
        "datetime",
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)?",
        "number",
    );
    grammar.add_pattern("time", r"\d{2}:\d{2}:\d{2}(?:\.\d+)?", "number");

    // Numbers
    grammar.add_pattern("hex", r"\b0x[0-9a-fA-F_]+\b", "number");
    grammar.add_pattern("binary", r"\b0b[01_]+\b", "number");
    grammar.add_pattern("octal", r"\b0o[0-7_]+\b", "number");
    grammar.add_pattern(
        "float",
        r"[+-]?(?:\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?|\binf\b|\bnan\b)",
        "number",
    );
    grammar.add_pattern("integer", r"[+-]?\b\d[\d_]*\b", "number");

    // Bare keys at the start of a line
    grammar.add_pattern("key", r"^[ \t]*[A-Za-z0-9_.-]+", "key");

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::TextDocument;
    use crate::engine::Engine;
    use crate::syntax::registry::PatternRegistry;
    use crate::syntax::Span;

    fn highlight(text: &str) -> Vec<Span> {
        let doc = TextDocument::new(text);
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_grammar(&doc, &toml_grammar());
        engine.highlight(&doc, 0..text.chars().count())
    }

    #[test]
    fn test_toml_grammar_compiles() {
        let grammar = toml_grammar();
        let registry = PatternRegistry::new(&grammar);
        assert_eq!(registry.syntax_defs().len(), grammar.syntax.len());
        assert_eq!(registry.patterns().len(), grammar.patterns.len());
    }

    #[test]
    fn test_toml_multiline_string() {
        let text = "a = \"\"\"\none \"quoted\"\n\"\"\"\nb = 1\n";
        let spans = highlight(text);
        let string = spans.iter().find(|s| s.style.as_str() == "string").unwrap();
        assert_eq!((string.start, string.end), (4, 24));
        assert!(spans.iter().any(|s| s.style.as_str() == "number" && s.start == 29));
    }

    #[test]
    fn test_toml_table_and_key() {
        let spans = highlight("[package]\nname = \"x\" # c\n");
        let styles: Vec<_> = spans.iter().map(|s| (s.start, s.end, s.style.as_str().to_string())).collect();
        assert_eq!(
            styles,
            vec![
                (0, 9, "section".to_string()),
                (10, 14, "key".to_string()),
                (17, 20, "string".to_string()),
                (21, 24, "comment".to_string()),
            ]
        );
    }
}
