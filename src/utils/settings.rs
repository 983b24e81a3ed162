//! Settings and credential lookup.
//!
//! Reads `$HOME/.commit-digest/settings.json` and uses its `env` map as a
//! fallback for environment variables, so credentials can live outside the
//! shell profile.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory under `$HOME` holding the settings file.
const SETTINGS_DIR: &str = ".commit-digest";

/// Settings loaded from `$HOME/.commit-digest/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path; a missing file gives empty settings.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(SETTINGS_DIR).join("settings.json"))
    }

    /// Returns an environment variable with fallback to these settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable with fallback to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Ok(value) = env::var(key) {
        return Ok(value);
    }

    match Settings::load() {
        Ok(settings) => settings
            .env
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Environment variable not found: {key}")),
        Err(err) => Err(anyhow::anyhow!("Environment variable not found: {key}").context(err)),
    }
}

/// Tries multiple environment variables with fallback to settings.
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow::anyhow!("None of the environment variables found: {keys:?}"))
}
