//! C/C++ grammar

use crate::syntax::grammar::Grammar;

/// Create the C grammar (also works for C++)
pub fn c_grammar() -> Grammar {
    let mut grammar = Grammar::new("C");
    grammar
        .add_extension("c")
        .add_extension("h")
        .add_extension("cpp")
        .add_extension("hpp")
        .add_extension("cc")
        .add_extension("cxx")
        .set_escape(Some('\\'));

    // Regions
    // A backslash before the newline continues a line comment
    grammar.add_syntax("line-comment", "//", "$", "comment");
    grammar.add_syntax("block-comment", r"/\*", r"\*/", "comment");
    // The whole literal is the start match so '"' never opens a string
    grammar.add_syntax("char", r"'(?:\\(?:x[0-9a-fA-F]+|[0-7]{1,3}|.)|[^\\'\n])'", "", "char");
    grammar.add_syntax("string", "\"", "\"", "string");

    // Flat patterns

    // Preprocessor directives
    grammar.add_pattern("preprocessor", r"^[ \t]*#[ \t]*\w+", "preprocessor");

    // Keywords
    let keywords = r"\b(?:auto|break|case|char|const|continue|default|do|double|else|enum|extern|float|for|goto|if|inline|int|long|register|restrict|return|short|signed|sizeof|static|struct|switch|typedef|union|unsigned|void|volatile|while|_Alignas|_Alignof|_Atomic|_Bool|_Complex|_Generic|_Imaginary|_Noreturn|_Static_assert|_Thread_local)\b";
    grammar.add_pattern("keyword", keywords, "keyword");

    // C++ keywords
    let cpp_keywords = r"\b(?:alignas|alignof|and|and_eq|asm|bitand|bitor|bool|catch|class|compl|concept|consteval|constexpr|constinit|const_cast|co_await|co_return|co_yield|decltype|delete|dynamic_cast|explicit|export|false|friend|mutable|namespace|new|noexcept|not|not_eq|nullptr|operator|or|or_eq|private|protected|public|reinterpret_cast|requires|static_assert|static_cast|template|this|thread_local|throw|true|try|typeid|typename|using|virtual|xor|xor_eq)\b";
    grammar.add_pattern("cpp-keyword", cpp_keywords, "keyword");

    // Standard type names
    let types = r"\b(?:size_t|ptrdiff_t|intptr_t|uintptr_t|int8_t|int16_t|int32_t|int64_t|uint8_t|uint16_t|uint32_t|uint64_t|FILE)\b";
    grammar.add_pattern("type", types, "type");
    grammar.add_pattern("null", r"\bNULL\b", "constant");

    // Numbers
    grammar.add_pattern("hex", r"\b0[xX][0-9a-fA-F]+[uUlL]*\b", "number");
    grammar.add_pattern("float", r"\b\d+\.\d*(?:[eE][+-]?\d+)?[fFlL]?", "number");
    grammar.add_pattern("float-fraction", r"\.\d+(?:[eE][+-]?\d+)?[fFlL]?\b", "number");
    grammar.add_pattern("integer", r"\b\d+[uUlL]*\b", "number");

    // Operators
    grammar.add_pattern("operator", r"[+\-*/%&|^!<>=~?:]+", "operator");

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::registry::PatternRegistry;

    #[test]
    fn test_c_grammar_compiles() {
        let grammar = c_grammar();
        let registry = PatternRegistry::new(&grammar);
        assert_eq!(registry.syntax_defs().len(), grammar.syntax.len());
        assert_eq!(registry.patterns().len(), grammar.patterns.len());
    }

    #[test]
    fn test_char_literal_is_one_region() {
        let registry = PatternRegistry::new(&c_grammar());
        let m = registry.find_syntax_start(r#"c = '"'; s = "x";"#, 0).unwrap();
        assert_eq!(registry.syntax(m.id).map(|d| d.id.as_str()), Some("char"));
        assert_eq!((m.start, m.end), (4, 7));
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let registry = PatternRegistry::new(&c_grammar());
        let text = "x; // note /* not a block\ny;";
        let m = registry.find_syntax_start(text, 0).unwrap();
        assert_eq!(m.start, 3);
        assert_eq!(registry.find_syntax_end(m.id, text, m.end), Some((25, 25)));
    }
}
