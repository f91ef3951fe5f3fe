use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: ModelSettings,
    pub retry: RetrySettings,
    pub credentials: CredentialSettings,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    pub endpoint: String,
    /// Per-request HTTP timeout. Unset means requests wait until the server
    /// answers or the connection drops.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ModelSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay_ms: 1000 }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CredentialSettings {
    /// Environment variables checked in order at startup.
    pub env_vars: Vec<String>,
    pub storage_path: Option<PathBuf>,
    pub fallback: Option<String>,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            env_vars: vec!["GEMINI_API_KEY".to_string(), "API_KEY".to_string()],
            storage_path: None,
            fallback: None,
        }
    }
}

impl CredentialSettings {
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ngle-analyzer")
                .join("credentials.json")
        })
    }
}

impl Config {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.name must not be empty".to_string()));
        }
        if !(self.model.endpoint.starts_with("http://") || self.model.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "model.endpoint must use http:// or https:// ('{}')",
                self.model.endpoint
            )));
        }
        Ok(self)
    }
}

pub fn parse_config(contents: &str, file_path: &Path) -> Result<Config, ConfigError> {
    toml::from_str::<Config>(contents)
        .map_err(|source| ConfigError::Parse { path: file_path.to_path_buf(), source })?
        .validate()
}

/// Loads `file_path`, falling back to defaults when the file does not exist.
pub fn load_config_from_file(file_path: &Path) -> Result<Config, ConfigError> {
    match fs::read_to_string(file_path) {
        Ok(contents) => parse_config(&contents, file_path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %file_path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read { path: file_path.to_path_buf(), source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("", Path::new("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.credentials.env_vars, vec!["GEMINI_API_KEY", "API_KEY"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            "[model]\nname = \"gemini-2.0-flash\"\n\n[retry]\nbase_delay_ms = 10\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.model.name, "gemini-2.0-flash");
        assert_eq!(config.model.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 10);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = parse_config("[retry]\nmax_attempts = 0\n", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse_config("[model\nname = 1", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
