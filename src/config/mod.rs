// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Tidyroom

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{OrganizerError, Result};

/// Environment variable consulted when `api.key` is not set
pub const API_KEY_ENV_VAR: &str = "LLM_API_KEY";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// LLM endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Sample workspace settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Upper bound on model round trips per organize call
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkspaceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

// Default value functions
fn default_model() -> String { "gpt-5-nano".to_string() }
fn default_provider() -> String { "openai".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_max_turns() -> usize { 25 }
fn default_data_dir() -> String { "data".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            provider: default_provider(),
            organization: None,
            base_url: None,
            timeout_secs: default_timeout(),
            max_turns: default_max_turns(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl ApiConfig {
    /// The configured key, or the environment fallback
    pub fn resolve_key(&self) -> Result<String> {
        self.resolve_key_with(std::env::var(API_KEY_ENV_VAR).ok())
    }

    fn resolve_key_with(&self, env_value: Option<String>) -> Result<String> {
        self.key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                OrganizerError::Config(format!(
                    "Missing API key. Set api.key in the config file or the {} env var.",
                    API_KEY_ENV_VAR
                ))
            })
    }

    /// Chat completions base URL for the configured provider
    pub fn endpoint(&self) -> Result<String> {
        if let Some(url) = &self.base_url {
            return Ok(url.trim_end_matches('/').to_string());
        }
        match self.provider.as_str() {
            "openai" => Ok("https://api.openai.com/v1".to_string()),
            "ollama" => Ok("http://localhost:11434/v1".to_string()),
            other => Err(OrganizerError::Config(format!(
                "Unknown provider '{}'; set api.base_url",
                other
            ))),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| OrganizerError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Load-once configuration cache, owned by whoever needs it
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    cached: Option<AppConfig>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached configuration, loading it on first use
    pub fn get(&mut self) -> Result<&AppConfig> {
        let config = match self.cached.take() {
            Some(config) => config,
            None => AppConfig::load(&self.path)?,
        };
        let cached = self.cached.insert(config);
        Ok(&*cached)
    }

    /// Re-read from disk, replacing the cache only on success
    pub fn reload(&mut self) -> Result<&AppConfig> {
        let fresh = AppConfig::load(&self.path)?;
        let cached = self.cached.insert(fresh);
        Ok(&*cached)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.provider, "openai");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api": {"key": "sk-test", "organization": "org-1"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api.key.as_deref(), Some("sk-test"));
        assert_eq!(config.api.organization.as_deref(), Some("org-1"));
        assert_eq!(config.api.model, "gpt-5-nano");
        assert_eq!(config.workspace.data_dir, "data");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(OrganizerError::Config(_))));
    }

    #[test]
    fn test_key_falls_back_to_env_value() {
        let api = ApiConfig::default();
        assert_eq!(api.resolve_key_with(Some("from-env".into())).unwrap(), "from-env");
        assert!(api.resolve_key_with(None).is_err());
        assert!(api.resolve_key_with(Some("  ".into())).is_err());

        let api = ApiConfig { key: Some("from-file".into()), ..ApiConfig::default() };
        assert_eq!(api.resolve_key_with(Some("from-env".into())).unwrap(), "from-file");
    }

    #[test]
    fn test_endpoint_by_provider() {
        let mut api = ApiConfig::default();
        assert_eq!(api.endpoint().unwrap(), "https://api.openai.com/v1");
        api.provider = "ollama".into();
        assert_eq!(api.endpoint().unwrap(), "http://localhost:11434/v1");
        api.provider = "acme".into();
        assert!(api.endpoint().is_err());
        api.base_url = Some("http://proxy.local/v1/".into());
        assert_eq!(api.endpoint().unwrap(), "http://proxy.local/v1");
    }

    #[test]
    fn test_store_caches_until_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.api.model = "first".into();
        config.save(&path).unwrap();

        let mut store = ConfigStore::new(&path);
        assert_eq!(store.get().unwrap().api.model, "first");

        config.api.model = "second".into();
        config.save(&path).unwrap();
        assert_eq!(store.get().unwrap().api.model, "first");
        assert_eq!(store.reload().unwrap().api.model, "second");

        store.invalidate();
        assert_eq!(store.get().unwrap().api.model, "second");
    }
}
