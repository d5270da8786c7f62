//! Configuration loading, validation, and management for Ferrule.
//!
//! Loads configuration from `~/.ferrule/config.toml` with environment
//! variable overrides (a `.env` file in the working directory is honored).
//! Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// The root configuration structure.
///
/// Maps directly to `~/.ferrule/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key. Absent = the gateway answers with placeholder replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Messages API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model requested from the gateway
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Where the transcript is loaded from and saved to
    #[serde(default = "default_conversation_file")]
    pub conversation_file: PathBuf,

    /// Orchestrator behavior
    #[serde(default)]
    pub agent: AgentConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_conversation_file() -> PathBuf {
    PathBuf::from("conversation.json")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("conversation_file", &self.conversation_file)
            .field("agent", &self.agent)
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// When a reply says "use the ... tool" without naming a registered
    /// tool, skip the tool call instead of falling back to `web_search`.
    #[serde(default)]
    pub strict_tool_detection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Root directory walked by `file_search`
    #[serde(default = "default_search_root")]
    pub search_root: PathBuf,

    /// Reject an out-of-range `end_line` in `file_edit` instead of clamping it.
    #[serde(default)]
    pub strict_line_range: bool,
}

fn default_search_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_root: default_search_root(),
            strict_line_range: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ferrule/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ANTHROPIC_API_KEY`
    /// - `ANTHROPIC_ENDPOINT`
    /// - `FERRULE_MODEL`
    /// - `FERRULE_CONVERSATION_FILE`
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Failed to load .env file: {e}"),
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
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

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = get("ANTHROPIC_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(model) = get("FERRULE_MODEL") {
            self.model = model;
        }
        if let Some(file) = get("FERRULE_CONVERSATION_FILE") {
            self.conversation_file = PathBuf::from(file);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ferrule")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError("endpoint must not be empty".into()));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            conversation_file: default_conversation_file(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
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
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.conversation_file, PathBuf::from("conversation.json"));
        assert!(!config.agent.strict_tool_detection);
        assert!(!config.tools.strict_line_range);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.tools.search_root, config.tools.search_root);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let config = AppConfig {
            max_tokens: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "claude-test"

[tools]
strict_line_range = true
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "claude-test");
        assert!(config.tools.strict_line_range);
        assert_eq!(config.tools.search_root, PathBuf::from("."));
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_tokens = \"lots\"").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ANTHROPIC_API_KEY", "sk-ant-env"),
            ("ANTHROPIC_ENDPOINT", "http://localhost:9999/v1/messages"),
            ("FERRULE_CONVERSATION_FILE", "/tmp/chat.json"),
            ("FERRULE_MODEL", "  "),
        ]);

        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-ant-env"));
        assert_eq!(config.endpoint, "http://localhost:9999/v1/messages");
        assert_eq!(config.conversation_file, PathBuf::from("/tmp/chat.json"));
        // blank values are ignored
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-ant-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-ant-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("conversation.json"));
        assert!(toml_str.contains("strict_line_range"));
        assert!(!toml_str.contains("api_key"));
    }
}
