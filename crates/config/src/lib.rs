//! Configuration loading, validation, and management for notus.
//!
//! Loads configuration from `notus.toml` in the working directory (or an
//! explicit path) with environment variable overrides. Validates all
//! settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `notus.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Provider endpoint configuration
    #[serde(default)]
    pub providers: ProviderEndpoints,

    /// Retrieval and history limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path. `:memory:` gives an ephemeral database.
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    "notus.db".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Provider base URLs. Overridable for proxies and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    /// Outbound request timeout in seconds. The model call is the only
    /// long-wall-clock operation in a pipeline invocation.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: default_openai_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Rows fetched per knowledge table per invocation.
    #[serde(default = "default_knowledge_per_table")]
    pub knowledge_per_table: usize,

    /// Prior turns replayed into provider history.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_knowledge_per_table() -> usize {
    5
}
fn default_history_turns() -> usize {
    10
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            knowledge_per_table: default_knowledge_per_table(),
            history_turns: default_history_turns(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            providers: ProviderEndpoints::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `notus.toml` in the working directory.
    ///
    /// Environment overrides (highest priority):
    /// - `NOTUS_HOST`, `NOTUS_PORT`
    /// - `NOTUS_DATABASE`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("notus.toml"))?;

        if let Ok(host) = std::env::var("NOTUS_HOST") {
            config.gateway.host = host;
        }
        if let Ok(port) = std::env::var("NOTUS_PORT") {
            config.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("NOTUS_PORT invalid: {port}")))?;
        }
        if let Ok(db) = std::env::var("NOTUS_DATABASE") {
            config.database.path = db;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.knowledge_per_table == 0 {
            return Err(ConfigError::ValidationError(
                "limits.knowledge_per_table must be at least 1".into(),
            ));
        }
        if self.providers.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "providers.request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 8787);
        assert_eq!(config.limits.knowledge_per_table, 5);
        assert_eq!(config.limits.history_turns, 10);
        assert!(config.providers.openai_base_url.contains("api.openai.com"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/notus.toml")).unwrap();
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gateway]\nport = 9000").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.database.path, "notus.db");
    }

    #[test]
    fn zero_knowledge_cap_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nknowledge_per_table = 0").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = AppConfig::default_toml();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, 8787);
    }
}
