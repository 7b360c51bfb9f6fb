//! Grammars, compiled patterns and styles
//!
//! This module provides everything the engine knows about a language:
//! - Grammar descriptions and their TOML loader
//! - The compiled pattern registry
//! - Style ids and the scheme that resolves them to colours
//! - Built-in grammars and extension-based detection

mod builtin;
mod grammar;
mod manager;
mod pattern;
mod registry;
mod style;

pub use grammar::{Grammar, PatternRule, SyntaxRule};
pub use manager::LanguageManager;
pub use pattern::{
    compile, find_next_unescaped, is_escaped, CompileError, PatternDef, PatternPart,
    SyntaxPatternDef,
};
pub use registry::{PatternRegistry, StartMatch, SyntaxId};
pub use style::{Color, Span, Style, StyleId, StyleScheme};
