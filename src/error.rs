//! Error types for regionhl

use thiserror::Error;

use crate::syntax::CompileError;

/// Result type alias for loading and I/O operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Errors raised while loading grammars, configuration or files.
///
/// The engine itself never fails an edit or a render; only the
/// loading paths return these.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid grammar: {0}")]
    Grammar(String),

    #[error(transparent)]
    Pattern(#[from] CompileError),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("{0}")]
    Message(String),
}
