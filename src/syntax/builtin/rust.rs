//! Rust grammar

use crate::syntax::grammar::Grammar;

/// Create the Rust grammar
pub fn rust_grammar() -> Grammar {
    let mut grammar = Grammar::new("Rust");
    grammar.add_extension("rs").set_escape(Some('\\'));

    // Regions, in tie-break order
    grammar.add_syntax("line-comment", "//", "$", "comment");
    // Nested block comments are not tracked; the first */ closes
    grammar.add_syntax("block-comment", r"/\*", r"\*/", "comment");
    // Raw strings (single hash only)
    grammar.add_syntax("raw-string", r##"b?r#""##, r##""#"##, "string");
    grammar.add_syntax("char", r"b?'(?:\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.)|[^\\'\n])'", "", "char");
    grammar.add_syntax("string", "b?\"", "\"", "string");

    // Flat patterns

    // Attributes
    grammar.add_pattern("attribute", r"#!?\[[^\]\n]*\]", "attribute");

    // Lifetimes
    grammar.add_pattern("lifetime", r"'\w+", "lifetime");

    // Macros (ending with !)
    grammar.add_pattern("macro", r"\b\w+!", "macro");

    // Keywords
    let keywords = r"\b(?:as|async|await|break|const|continue|crate|dyn|else|enum|extern|false|fn|for|if|impl|in|let|loop|match|mod|move|mut|pub|ref|return|self|Self|static|struct|super|trait|true|type|union|unsafe|use|where|while)\b";
    grammar.add_pattern("keyword", keywords, "keyword");

    // Built-in types
    let types = r"\b(?:bool|char|str|u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize|f32|f64|String|Vec|Box|Rc|Arc|Option|Result|Some|None|Ok|Err)\b";
    grammar.add_pattern("type", types, "type");

    // Type names (capitalized identifiers)
    grammar.add_pattern("type-name", r"\b[A-Z][a-zA-Z0-9_]*\b", "type");

    // Numbers
    grammar.add_pattern("hex", r"\b0x[0-9a-fA-F_]+\b", "number");
    grammar.add_pattern("binary", r"\b0b[01_]+\b", "number");
    grammar.add_pattern("octal", r"\b0o[0-7_]+\b", "number");
    grammar.add_pattern("float", r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?\b", "number");
    grammar.add_pattern(
        "integer",
        r"\b\d[\d_]*(?:u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize)?\b",
        "number",
    );

    // Operators
    grammar.add_pattern("operator", r"[+\-*/%&|^!<>=@]+", "operator");

    grammar
}
