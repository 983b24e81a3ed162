//! Digest configuration.
//!
//! All thresholds, ratios and the non-code extension set live in one
//! immutable [`DigestConfig`] that is passed into every entry point of the
//! batching engine. A YAML file can override any subset of the defaults.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default characters-per-token ratio for the size heuristic.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 3;

/// Default cap on a single file's patch text, in characters (about 30K tokens).
pub const DEFAULT_MAX_FILE_DIFF_CHARS: usize = 90_000;

/// Below this estimated size the whole repository goes out in one call.
pub const DEFAULT_SINGLE_PASS_THRESHOLD: usize = 100_000;

/// Below this estimated size (and above the single-pass one) days are
/// batched; above it large days are compressed individually.
pub const DEFAULT_DAY_SPLIT_THRESHOLD: usize = 700_000;

/// Maximum accumulated size of a packed batch of small days.
pub const DEFAULT_BATCH_THRESHOLD: usize = 90_000;

/// Pause after each diff fetch, in milliseconds.
pub const DEFAULT_DIFF_FETCH_DELAY_MS: u64 = 500;

/// Default Summarizer model.
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5";

/// Default response token limit for the Summarizer.
pub const DEFAULT_MAX_TOKENS: u32 = 2500;

/// Default sampling temperature for the Summarizer.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// File extensions (with leading dot) that never carry reviewable code.
pub const DEFAULT_NON_CODE_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".bmp", ".tiff",
    // Video
    ".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm",
    // Audio
    ".mp3", ".wav", ".ogg", ".flac",
    // Archives and binaries
    ".zip", ".tar", ".gz", ".rar", ".7z", ".exe", ".dll", ".so", ".dylib",
    // Office documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Web fonts
    ".woff", ".woff2", ".ttf", ".eot", ".otf",
    // Lock files
    ".lock",
];

/// Configuration validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The size heuristic would divide by zero.
    #[error("chars_per_token must be greater than zero")]
    ZeroCharsPerToken,

    /// Tier thresholds are not strictly increasing.
    #[error(
        "single_pass_threshold ({single_pass}) must be below day_split_threshold ({day_split})"
    )]
    ThresholdOrder {
        /// Configured single-pass threshold.
        single_pass: usize,
        /// Configured day-split threshold.
        day_split: usize,
    },

    /// The GitHub API base is not a valid URL.
    #[error("Invalid github_api_base '{0}'")]
    InvalidApiBase(String),
}

/// Immutable configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Characters per estimated token.
    pub chars_per_token: usize,
    /// Per-file patch cap in characters.
    pub max_file_diff_chars: usize,
    /// Tier 1 ceiling, also the "large day" cutoff and the Tier 3 day budget.
    pub single_pass_threshold: usize,
    /// Tier 2 ceiling.
    pub day_split_threshold: usize,
    /// Batch packer threshold for small days.
    pub batch_threshold: usize,
    /// Lower-cased extensions (with leading dot) dropped by the normalizer.
    pub non_code_extensions: BTreeSet<String>,
    /// Pause after each diff fetch, in milliseconds.
    pub diff_fetch_delay_ms: u64,
    /// Summarizer model identifier.
    pub model: String,
    /// Summarizer response token limit.
    pub max_tokens: u32,
    /// Summarizer sampling temperature.
    pub temperature: f32,
    /// GitHub REST API base URL.
    pub github_api_base: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            max_file_diff_chars: DEFAULT_MAX_FILE_DIFF_CHARS,
            single_pass_threshold: DEFAULT_SINGLE_PASS_THRESHOLD,
            day_split_threshold: DEFAULT_DAY_SPLIT_THRESHOLD,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            non_code_extensions: DEFAULT_NON_CODE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            diff_fetch_delay_ms: DEFAULT_DIFF_FETCH_DELAY_MS,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
        }
    }
}

impl DigestConfig {
    /// Loads a configuration file, falling back to defaults for absent keys.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks the invariants the batching engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chars_per_token == 0 {
            return Err(ConfigError::ZeroCharsPerToken);
        }
        if self.single_pass_threshold >= self.day_split_threshold {
            return Err(ConfigError::ThresholdOrder {
                single_pass: self.single_pass_threshold,
                day_split: self.day_split_threshold,
            });
        }
        url::Url::parse(&self.github_api_base)
            .map_err(|_| ConfigError::InvalidApiBase(self.github_api_base.clone()))?;
        Ok(())
    }
}
