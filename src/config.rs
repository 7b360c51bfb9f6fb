//! Engine configuration
//!
//! Loads tuning knobs from ~/.regionhl.toml (or %USERPROFILE%\.regionhl.toml on Windows)
//!
//! Format: TOML, settings live in an `[engine]` table with kebab-case keys.
//! Unknown keys are ignored and out-of-range values are clamped.
//!
//! Example:
//! ```text
//! [engine]
//! time-slice-ms = 30
//! initial-batch = 40960
//! minimum-batch = 10240
//! update-step-budget = 64
//! bracket-match-limit = 10000
//! highlight = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use toml::{Table, Value};

use crate::error::Result;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Target duration of one background quantum
    pub time_slice: Duration,
    /// Chars analyzed in the first quantum
    pub initial_batch: usize,
    /// Floor on the adaptive batch size
    pub minimum_batch: usize,
    /// Max boundary steps the edit fast path may take
    pub update_step_budget: usize,
    /// Distance cutoff for cursor-driven bracket matching
    pub bracket_match_limit: usize,
    /// Whether highlighting starts enabled
    pub highlight: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_slice: Duration::from_millis(30),
            initial_batch: 40_960,
            minimum_batch: 10_240,
            update_step_budget: 64,
            bracket_match_limit: 10_000,
            highlight: true,
        }
    }
}

impl EngineConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".regionhl.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".regionhl.toml"))
        }
    }

    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Build a configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings = Self::parse(contents)?;
        let mut config = Self::default();
        config.apply(&settings);
        Ok(config)
    }

    /// Parse config file contents and pick out the `[engine]` table
    fn parse(contents: &str) -> Result<Table> {
        let mut table: Table = contents.parse()?;
        Ok(match table.remove("engine") {
            Some(Value::Table(engine)) => engine,
            _ => Table::new(),
        })
    }

    /// Apply settings from a parsed `[engine]` table
    fn apply(&mut self, settings: &Table) {
        if let Some(ms) = integer(settings, "time-slice-ms") {
            self.time_slice = Duration::from_millis(ms.clamp(1, 1000) as u64);
        }

        if let Some(n) = integer(settings, "initial-batch") {
            self.initial_batch = n.max(1) as usize;
        }

        if let Some(n) = integer(settings, "minimum-batch") {
            self.minimum_batch = n.max(1) as usize;
        }

        if let Some(n) = integer(settings, "update-step-budget") {
            self.update_step_budget = n.clamp(1, 100_000) as usize;
        }

        if let Some(n) = integer(settings, "bracket-match-limit") {
            self.bracket_match_limit = n.max(1) as usize;
        }

        if let Some(Value::Boolean(on)) = settings.get("highlight") {
            self.highlight = *on;
        }
    }
}

/// Integer setting, ignoring values of any other type
fn integer(settings: &Table, key: &str) -> Option<i64> {
    match settings.get(key) {
        Some(Value::Integer(n)) => Some(*n),
        Some(other) => {
            log::warn!("config key `{key}` expects an integer, got {}", other.type_str());
            None
        }
        None => None,
    }
}
