//! regionhl - incremental region-based syntax highlighting
//!
//! A grammar declares *syntax regions* (comments, strings) bounded by a
//! start and an end regex, and *flat patterns* (keywords, numbers) that
//! only apply outside regions. The [`Engine`] keeps a table of region
//! boundaries for a [`Document`], repairs it after each edit, and renders
//! styled [`Span`]s for whatever range a caller asks for.

pub mod bracket;
pub mod buffer;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod syntax;

pub use buffer::Buffer;
pub use config::EngineConfig;
pub use document::{Document, TextDocument};
pub use engine::{Engine, ListenerId};
pub use error::{HighlightError, Result};
pub use syntax::{Color, Grammar, LanguageManager, Span, Style, StyleId, StyleScheme};
