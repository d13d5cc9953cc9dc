//! Configuration management
//!
//! Settings live in `settings.json` in the data root:
//! ```json
//! {
//!   "app": { "storage": "csv", "allowDemoAccounts": true }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "settings.json";

/// Where users, favorites and reviews are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Csv,
    Duckdb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Csv => write!(f, "csv"),
            StorageBackend::Duckdb => write!(f, "duckdb"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(StorageBackend::Csv),
            "duckdb" => Ok(StorageBackend::Duckdb),
            other => bail!("Unknown storage backend '{}' (expected csv or duckdb)", other),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    storage: StorageBackend,
    #[serde(default = "default_true")]
    allow_demo_accounts: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            allow_demo_accounts: true,
            other: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

/// Mimo configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub allow_demo_accounts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Csv,
            allow_demo_accounts: true,
        }
    }
}

impl Config {
    /// Load config from the data root
    ///
    /// Environment variables take precedence over the file:
    /// `MIMO_STORAGE` (csv | duckdb) and `MIMO_ALLOW_DEMO_ACCOUNTS`.
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::load_file(root)?;
        config.apply_overrides(
            std::env::var("MIMO_STORAGE").ok().as_deref(),
            std::env::var("MIMO_ALLOW_DEMO_ACCOUNTS").ok().as_deref(),
        )?;
        Ok(config)
    }

    /// Load only what settings.json says, ignoring environment overrides
    ///
    /// Use this before `save` so overrides never leak into the file.
    pub fn load_file(root: &Path) -> Result<Self> {
        let raw = read_settings(root)?;
        Ok(Self {
            storage: raw.app.storage,
            allow_demo_accounts: raw.app.allow_demo_accounts,
        })
    }

    fn apply_overrides(&mut self, storage: Option<&str>, allow_demo: Option<&str>) -> Result<()> {
        if let Some(value) = storage {
            self.storage = value.parse().context("Invalid MIMO_STORAGE")?;
        }
        if let Some(allow) = allow_demo.and_then(parse_bool) {
            self.allow_demo_accounts = allow;
        }
        Ok(())
    }

    /// Save config to the data root, preserving settings this crate does not manage
    pub fn save(&self, root: &Path) -> Result<()> {
        let mut settings = read_settings(root)?;
        settings.app.storage = self.storage;
        settings.app.allow_demo_accounts = self.allow_demo_accounts;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(root.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Set a key by its settings.json name (`storage`, `allowDemoAccounts`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage" | "app.storage" => self.storage = value.parse()?,
            "allowDemoAccounts" | "app.allowDemoAccounts" => {
                self.allow_demo_accounts = parse_bool(value)
                    .with_context(|| format!("Expected true or false, got '{}'", value))?;
            }
            other => bail!("Unknown config key: {}", other),
        }
        Ok(())
    }
}

/// A missing or unreadable settings file yields defaults; I/O errors propagate
fn read_settings(root: &Path) -> Result<SettingsFile> {
    let settings_path = root.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let raw = read_settings(dir.path()).unwrap();
        assert_eq!(raw.app.storage, StorageBackend::Csv);
        assert!(raw.app.allow_demo_accounts);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app":{"theme":"dark"},"plugins":{"x":1}}"#,
        )
        .unwrap();

        let config = Config {
            storage: StorageBackend::Duckdb,
            allow_demo_accounts: false,
        };
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["storage"], "duckdb");
        assert_eq!(saved["app"]["allowDemoAccounts"], false);
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["plugins"]["x"], 1);

        let raw = read_settings(dir.path()).unwrap();
        assert_eq!(raw.app.storage, StorageBackend::Duckdb);
        assert!(!raw.app.allow_demo_accounts);
    }

    #[test]
    fn test_set() {
        let mut config = Config::default();
        config.set("storage", "DuckDB").unwrap();
        config.set("app.allowDemoAccounts", "no").unwrap();
        assert_eq!(config.storage, StorageBackend::Duckdb);
        assert!(!config.allow_demo_accounts);

        assert!(config.set("storage", "sqlite").is_err());
        assert!(config.set("allowDemoAccounts", "maybe").is_err());
        assert!(config.set("theme", "dark").is_err());
    }

    #[test]
    fn test_overrides_stay_out_of_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app":{"storage":"csv","allowDemoAccounts":true}}"#,
        )
        .unwrap();

        let mut effective = Config::load_file(dir.path()).unwrap();
        effective.apply_overrides(Some("duckdb"), Some("false")).unwrap();
        assert_eq!(effective.storage, StorageBackend::Duckdb);
        assert!(!effective.allow_demo_accounts);
        assert!(effective.apply_overrides(Some("sqlite"), None).is_err());

        let mut config = Config::load_file(dir.path()).unwrap();
        assert_eq!(config.storage, StorageBackend::Csv);
        config.set("allowDemoAccounts", "false").unwrap();
        config.save(dir.path()).unwrap();

        let raw = read_settings(dir.path()).unwrap();
        assert_eq!(raw.app.storage, StorageBackend::Csv);
        assert!(!raw.app.allow_demo_accounts);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        let raw = read_settings(dir.path()).unwrap();
        assert_eq!(raw.app.storage, StorageBackend::Csv);
    }
}
