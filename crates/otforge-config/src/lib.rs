//! Configuration system for otforge.
//!
//! Load engine configuration from TOML or YAML files to choose the ranking
//! bias, the learner's collection and mismatch policies, and the typology
//! search's parallelism without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use otforge_config::{BiasConfig, OtConfig, ThreadCount};
//!
//! let config = OtConfig::from_toml_str(r#"
//!     [bias]
//!     type = "faithfulness_low"
//!
//!     [learner]
//!     max_passes = 50
//!
//!     [typology]
//!     thread_count = { count = 4 }
//!     language_limit = 100
//! "#).unwrap();
//!
//! assert_eq!(config.bias, BiasConfig::FaithfulnessLow);
//! assert_eq!(config.learner.max_passes, 50);
//! assert_eq!(config.typology.thread_count, ThreadCount::Count(4));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use otforge_config::OtConfig;
//!
//! let config = OtConfig::load("otforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on learner passes.
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OtConfig {
    /// Bias policy used by every RCD invocation.
    #[serde(default)]
    pub bias: BiasConfig,

    /// Incremental learner configuration.
    #[serde(default)]
    pub learner: LearnerConfig,

    /// Factorial typology search configuration.
    #[serde(default)]
    pub typology: TypologyConfig,
}

impl OtConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.learner.max_passes == 0 {
            return Err(ConfigError::Invalid(
                "learner.max_passes must be at least 1".to_string(),
            ));
        }
        if self.typology.thread_count == ThreadCount::Count(0) {
            return Err(ConfigError::Invalid(
                "typology.thread_count must be at least 1".to_string(),
            ));
        }
        if let BiasConfig::ConstraintsLow { constraints } = &self.bias {
            if constraints.is_empty() {
                return Err(ConfigError::Invalid(
                    "bias.constraints must name at least one constraint".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Sets the bias policy.
    pub fn with_bias(mut self, bias: BiasConfig) -> Self {
        self.bias = bias;
        self
    }

    /// Sets the learner pass limit.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.learner.max_passes = max_passes;
        self
    }

    /// Sets the typology thread count.
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.typology.thread_count = thread_count;
        self
    }

    /// Sets the typology language limit.
    pub fn with_language_limit(mut self, limit: usize) -> Self {
        self.typology.language_limit = Some(limit);
        self
    }
}

/// Bias policy applied when several constraints can be placed in one stratum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BiasConfig {
    /// Place every rankable constraint as high as possible.
    #[default]
    Unbiased,

    /// Keep faithfulness constraints as low as possible.
    FaithfulnessLow,

    /// Keep markedness constraints as low as possible.
    MarkednessLow,

    /// Keep the named constraints as low as possible.
    ConstraintsLow {
        /// Constraint names to defer.
        constraints: Vec<String>,
    },
}

/// Incremental learner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LearnerConfig {
    /// Maximum number of collect/rank passes before giving up.
    pub max_passes: usize,

    /// When the learner stops collecting and re-ranks.
    pub collection: CollectionMode,

    /// What counts as a mismatch between prediction and observation.
    pub mismatch: MismatchRule,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            collection: CollectionMode::default(),
            mismatch: MismatchRule::default(),
        }
    }
}

/// When the learner re-ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMode {
    /// Collect mismatches over all data, then rank once.
    #[default]
    FullPass,

    /// Rank after the first mismatching datum.
    FirstError,
}

/// What the learner treats as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchRule {
    /// Mismatch only when the observed winner is not among the optima.
    #[default]
    Lenient,

    /// Every optimum with a violation profile different from the observed
    /// winner's is a mismatch.
    Strict,
}

/// Factorial typology search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TypologyConfig {
    /// Number of threads exploring top-level branches.
    pub thread_count: ThreadCount,

    /// Stop after this many languages (None = exhaustive).
    pub language_limit: Option<usize>,

    /// Drop simply harmonically bounded candidates before searching.
    pub prune_harmonically_bounded: bool,
}

impl Default for TypologyConfig {
    fn default() -> Self {
        Self {
            thread_count: ThreadCount::default(),
            language_limit: None,
            prune_harmonically_bounded: true,
        }
    }
}

/// Thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// Automatically determine thread count.
    #[default]
    Auto,

    /// Search sequentially on the calling thread.
    None,

    /// Specific number of threads.
    Count(usize),
}

impl ThreadCount {
    /// Resolves the thread count to an actual number.
    ///
    /// # Arguments
    ///
    /// * `branch_count` - Number of independent branches to process
    pub fn resolve(&self, branch_count: usize) -> usize {
        let available = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        let threads = match self {
            ThreadCount::Auto => available,
            ThreadCount::None => 1,
            ThreadCount::Count(n) => *n,
        };
        threads.min(branch_count).max(1)
    }
}

impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::None => write!(f, "None"),
            ThreadCount::Count(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests;
