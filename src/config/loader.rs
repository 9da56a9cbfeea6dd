//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (applied by the binary)
//! 2. CI inputs and environment variables
//! 3. TOML file passed with `--config`
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::constants;
use crate::diff::filter::parse_patterns;
use crate::env::Env;

/// Errors during config loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub model: ModelConfig,
    pub review: ReviewConfig,
}

/// Hosting API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

/// Completion endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Full URL of the chat completions endpoint (without query string).
    /// Defaults to [`constants::DEFAULT_COMPLETION_ENDPOINT`].
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::DEFAULT_COMPLETION_ENDPOINT.to_string(),
            api_key: None,
            api_version: constants::DEFAULT_API_VERSION.to_string(),
            max_tokens: constants::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Review behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Glob patterns of destination paths to skip.
    pub exclude: Vec<String>,
    /// Completion calls allowed in flight at once (1 = sequential).
    pub max_concurrent: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            max_concurrent: 1,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads the optional config file, then applies CI inputs and
    /// environment variables. Call [`Config::validate`] once CLI
    /// overrides have been applied.
    pub fn load(file: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::load_file(path)?,
            None => Config::default(),
        };
        config.apply_env_vars(env);
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply CI input and environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.input(constants::ENV_GITHUB_API_URL) {
            self.github.api_url = val;
        }
        if let Some(val) = env.input(constants::ENV_INPUT_GITHUB_TOKEN) {
            self.github.token = Some(val);
        }
        if let Some(val) = env.input(constants::ENV_INPUT_API_KEY) {
            self.model.api_key = Some(val);
        }
        if let Some(val) = env.input(constants::ENV_INPUT_ENDPOINT) {
            self.model.endpoint = val;
        }
        if let Some(val) = env.input(constants::ENV_INPUT_API_VERSION) {
            self.model.api_version = val;
        }
        if let Some(val) = env.input(constants::ENV_INPUT_MAX_TOKENS) {
            match val.parse() {
                Ok(n) => self.model.max_tokens = n,
                Err(_) => warn!(
                    "ignoring invalid {} value: {val}",
                    constants::ENV_INPUT_MAX_TOKENS
                ),
            }
        }
        if let Some(val) = env.input(constants::ENV_INPUT_EXCLUDE) {
            self.review.exclude = parse_patterns(&val);
        }
        if let Some(val) = env.input(constants::ENV_INPUT_MAX_CONCURRENT) {
            match val.parse() {
                Ok(n) => self.review.max_concurrent = n,
                Err(_) => warn!(
                    "ignoring invalid {} value: {val}",
                    constants::ENV_INPUT_MAX_CONCURRENT
                ),
            }
        }
    }

    /// Check that every setting the review run needs is present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(self.github.token.as_deref()) {
            return Err(ConfigError::Missing("GitHub token (INPUT_GITHUB_TOKEN)"));
        }
        if is_blank(self.model.api_key.as_deref()) {
            return Err(ConfigError::Missing("completion API key (INPUT_API_KEY)"));
        }
        match self.model.endpoint.trim() {
            "" => return Err(ConfigError::Missing("completion endpoint (INPUT_ENDPOINT)")),
            url if !(url.starts_with("https://") || url.starts_with("http://")) => {
                return Err(ConfigError::Invalid {
                    name: "model.endpoint",
                    reason: format!("not an http(s) URL: {url}"),
                });
            }
            _ => {}
        }
        if self.github.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("GitHub API URL"));
        }
        if self.model.api_version.trim().is_empty() {
            return Err(ConfigError::Missing("completion API version"));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                name: "model.max_tokens",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.review.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                name: "review.max_concurrent",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci_env() -> Env {
        Env::mock([
            ("INPUT_GITHUB_TOKEN", "ghs_token"),
            ("INPUT_API_KEY", "model-key"),
            ("INPUT_ENDPOINT", "https://models.example.com/chat/completions"),
        ])
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.model.api_version, constants::DEFAULT_API_VERSION);
        assert_eq!(config.model.max_tokens, 700);
        assert_eq!(config.review.max_concurrent, 1);
        assert!(config.review.exclude.is_empty());
    }

    #[test]
    fn load_from_ci_inputs() {
        let config = Config::load(None, &ci_env()).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghs_token"));
        assert_eq!(config.model.api_key.as_deref(), Some("model-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn token_key_and_exclude_inputs_are_enough() {
        let env = Env::mock([
            ("INPUT_GITHUB_TOKEN", "t"),
            ("INPUT_API_KEY", "k"),
            ("INPUT_EXCLUDE", "*.md"),
        ]);
        let config = Config::load(None, &env).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.endpoint, constants::DEFAULT_COMPLETION_ENDPOINT);
    }

    #[test]
    fn endpoint_input_overrides_default() {
        let config = Config::load(None, &ci_env()).unwrap();
        assert_eq!(
            config.model.endpoint,
            "https://models.example.com/chat/completions"
        );
    }

    #[test]
    fn exclude_input_is_split_on_commas() {
        let env = Env::mock([("INPUT_EXCLUDE", "*.md, dist/**")]);
        let config = Config::load(None, &env).unwrap();
        assert_eq!(config.review.exclude, vec!["*.md", "dist/**"]);
    }

    #[test]
    fn invalid_numeric_inputs_are_ignored() {
        let env = Env::mock([("INPUT_MAX_TOKENS", "lots"), ("INPUT_MAX_CONCURRENT", "-1")]);
        let config = Config::load(None, &env).unwrap();
        assert_eq!(config.model.max_tokens, 700);
        assert_eq!(config.review.max_concurrent, 1);
    }

    #[test]
    fn file_then_env_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.toml");
        std::fs::write(
            &path,
            r#"
[model]
endpoint = "https://file.example.com/v1/chat/completions"
max_tokens = 1200

[review]
exclude = ["vendor/**"]
max_concurrent = 3
"#,
        )
        .unwrap();

        let env = Env::mock([("INPUT_MAX_TOKENS", "900")]);
        let config = Config::load(Some(&path), &env).unwrap();
        assert_eq!(
            config.model.endpoint,
            "https://file.example.com/v1/chat/completions"
        );
        assert_eq!(config.model.max_tokens, 900);
        assert_eq!(config.review.exclude, vec!["vendor/**"]);
        assert_eq!(config.review.max_concurrent, 3);
        assert_eq!(config.model.api_version, constants::DEFAULT_API_VERSION);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[model\nendpoint = ").unwrap();
        let err = Config::load(Some(&path), &Env::mock(Vec::<(&str, &str)>::new())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(
            Some(Path::new("/tmp/ai_codereview_missing.toml")),
            &Env::mock(Vec::<(&str, &str)>::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn validate_requires_token() {
        let env = Env::mock([("INPUT_API_KEY", "k"), ("INPUT_ENDPOINT", "https://x")]);
        let err = Config::load(None, &env).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("GitHub token"), "got: {err}");
    }

    #[test]
    fn validate_rejects_blank_api_key() {
        let mut config = Config::load(None, &ci_env()).unwrap();
        config.model.api_key = Some("  ".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("API key"), "got: {err}");
    }

    #[test]
    fn validate_requires_endpoint_url() {
        let mut config = Config::load(None, &ci_env()).unwrap();
        config.model.endpoint = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));

        config.model.endpoint = "models.example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut config = Config::load(None, &ci_env()).unwrap();
        config.review.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = Config::load(None, &ci_env()).unwrap();
        config.model.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::load(None, &ci_env()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghs_token"));
        assert!(!debug.contains("model-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
