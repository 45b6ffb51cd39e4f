//! Application configuration for readlater.
//!
//! User config lives at `~/.readlater/readlater.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReadLaterError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "readlater.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".readlater";

// ---------------------------------------------------------------------------
// Config structs (matching readlater.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page fetching limits.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Where articles are persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Classification settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// OpenRouter settings (used by the `openrouter` classifier backend).
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Reply formatting.
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirect hops before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Largest response body accepted, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,

    /// Allow loopback/private targets. Only meant for local testing.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_response_bytes: default_max_response_bytes(),
            allow_private_hosts: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_max_redirects() -> usize {
    5
}
fn default_max_response_bytes() -> u64 {
    5 * 1024 * 1024
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file. `~` is expanded.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "~/.readlater/readlater.db".into()
}

/// Which classifier implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Deterministic vocabulary/frequency rules.
    #[default]
    Rules,
    /// Chat model behind the OpenRouter API.
    OpenRouter,
}

/// `[classifier]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,

    /// Reading speed used for read-time estimates.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,

    /// Maximum number of keywords kept per article, at most [`crate::MAX_KEYWORDS`].
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            words_per_minute: default_words_per_minute(),
            max_keywords: default_max_keywords(),
        }
    }
}

fn default_words_per_minute() -> u32 {
    200
}
fn default_max_keywords() -> usize {
    crate::types::MAX_KEYWORDS
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for classification.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API base URL (overridable for tests and proxies).
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}

/// `[responder]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Maximum articles returned by list/search commands.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Length of the stored body excerpt, in characters.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_list_limit() -> usize {
    20
}
fn default_snippet_chars() -> usize {
    500
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.readlater/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReadLaterError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.readlater/readlater.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReadLaterError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ReadLaterError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReadLaterError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReadLaterError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReadLaterError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| ReadLaterError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Check that the OpenRouter API key env var is set and non-empty.
/// Returns the key.
pub fn validate_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openrouter.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ReadLaterError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable,\n\
             or switch [classifier] backend to \"rules\"."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("database_path"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(toml_str.contains("backend = \"rules\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 10);
        assert_eq!(parsed.fetch.max_redirects, 5);
        assert_eq!(parsed.classifier.words_per_minute, 200);
        assert_eq!(parsed.classifier.max_keywords, 5);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml_str = r#"
[storage]
database_path = "/tmp/readlater.db"

[classifier]
backend = "openrouter"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.storage.database_path, "/tmp/readlater.db");
        assert_eq!(config.classifier.backend, ClassifierBackend::OpenRouter);
        assert_eq!(config.classifier.max_keywords, 5);
        assert_eq!(config.responder.list_limit, 20);
        assert!(!config.fetch.allow_private_hosts);
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        let p = expand_home("/var/lib/readlater.db").expect("expand");
        assert_eq!(p, PathBuf::from("/var/lib/readlater.db"));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openrouter.api_key_env = "RL_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
