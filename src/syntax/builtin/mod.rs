//! Built-in grammars
//!
//! Grammars for a few common languages, available without any grammar
//! files on disk.

mod c;
mod rust;
mod toml_lang;

use super::grammar::Grammar;

/// Get all built-in grammars
pub fn all_grammars() -> Vec<Grammar> {
    vec![rust::rust_grammar(), c::c_grammar(), toml_lang::toml_grammar()]
}
