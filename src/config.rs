//! Configuration file handling.
//!
//! This module provides loading and saving of forgecheck configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/forgecheck/config.toml`
//! - macOS: `~/Library/Application Support/forgecheck/config.toml`
//! - Windows: `%APPDATA%\forgecheck\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! metadata_file = "/var/lib/forgecheck/forge.json"
//! advisories_file = "/var/lib/forgecheck/advisories.json"
//! concurrency = 8
//!
//! [ignore]
//! modules = ["puppetlabs-apache", "example42-*"]
//! advisories = ["FORGE-2021-0001"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::checker::{normalize_slug, DEFAULT_CONCURRENCY};

/// Application configuration.
///
/// Command-line flags take precedence over these values.
///
/// # Example
///
/// ```no_run
/// use forgecheck::Config;
///
/// let config = Config::load().unwrap();
/// println!("Concurrency: {}", config.concurrency);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Forge metadata snapshot used when `--metadata` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_file: Option<PathBuf>,

    /// Advisory database used when `--advisories` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisories_file: Option<PathBuf>,

    /// Maximum number of metadata lookups in flight.
    ///
    /// Default: 8
    pub concurrency: usize,

    /// Ignore list configuration for suppressing known issues.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Modules and advisories to leave out of reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Module slugs to skip entirely. Supports `*` wildcards.
    ///
    /// Patterns are compared against the normalized slug, so
    /// `puppetlabs/apache` and `puppetlabs-apache` are equivalent.
    pub modules: Vec<String>,

    /// Advisory IDs that should never be reported.
    pub advisories: Vec<String>,
}

impl IgnoreConfig {
    pub fn should_ignore_module(&self, module: &str) -> bool {
        let slug = normalize_slug(module);
        self.modules
            .iter()
            .any(|pattern| glob_match(&normalize_slug(pattern), &slug))
    }

    pub fn should_ignore_advisory(&self, advisory_id: &str) -> bool {
        self.advisories
            .iter()
            .any(|id| id.eq_ignore_ascii_case(advisory_id))
    }
}

/// Glob matching where `*` matches any run of characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() {
        return false;
    }
    if !text[first.len()..].ends_with(last) {
        return false;
    }

    let mut remaining = &text[first.len()..text.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            metadata_file: None,
            advisories_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("forgecheck")
            .join("config.toml")
    }

    /// Renders the default configuration as TOML.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
