//! Configuration loaded from `lint-scope.toml`.
//!
//! ```toml
//! # Status rows must match this pattern (case-insensitive) to be linted
//! filter = '.+\.(js|jsx)$'
//! # Status codes that are never linted
//! exclude_statuses = ["D"]
//! # Context lines passed to `git diff -U`
//! context_lines = 0
//! ```

use error_set::error_set;
use regex::RegexBuilder;
use serde::Deserialize;
use std::path::Path;

use crate::status::MatchFilterOptions;

/// File looked up in the repository root when no config path is given
pub const CONFIG_FILE_NAME: &str = "lint-scope.toml";

error_set! {
    /// Errors from loading or validating configuration
    ConfigError := {
        #[display("Failed to read config {path}: {message}")]
        ReadFailed { path: String, message: String },
        #[display("Invalid config: {message}")]
        InvalidToml { message: String },
        #[display("Invalid filter pattern '{pattern}': {message}")]
        InvalidFilter { pattern: String, message: String },
        #[display("Invalid status code '{code}': expected a single character")]
        InvalidStatusCode { code: String },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pattern a status row must match; empty disables filtering
    pub filter: String,
    pub exclude_statuses: Vec<String>,
    pub context_lines: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: r".+\.js$".to_string(),
            exclude_statuses: vec!["D".to_string()],
            context_lines: 0,
        }
    }
}

impl Config {
    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::InvalidToml {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Use `explicit` if given, else `lint-scope.toml` in `repo_root` if it
    /// exists, else the defaults
    pub fn discover(repo_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = repo_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.filter.is_empty() {
            RegexBuilder::new(&self.filter)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidFilter {
                    pattern: self.filter.clone(),
                    message: e.to_string(),
                })?;
        }

        for code in &self.exclude_statuses {
            if code.chars().count() != 1 {
                return Err(ConfigError::InvalidStatusCode { code: code.clone() });
            }
        }

        Ok(())
    }

    /// Status row filtering described by this config
    pub fn match_options(&self) -> MatchFilterOptions {
        let filter = (!self.filter.is_empty()).then(|| self.filter.clone());
        MatchFilterOptions::new(
            self.exclude_statuses.iter().filter_map(|code| code.chars().next()),
            filter,
        )
    }
}
