//! Typed configuration for building a StepFun chat client.
//!
//! Connection settings apply to every StepFun API; the `chat` section may override the base URL
//! and API key for chat completions only.
//!
//! ```rust
//! use stepfun::StepFunConfig;
//!
//! let config: StepFunConfig = serde_json::from_str(
//!     r#"{ "api_key": "sk-connection", "chat": { "api_key": "sk-chat", "max_tool_rounds": 4 } }"#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.effective_api_key().expect("key").expose(), "sk-chat");
//! assert_eq!(config.effective_base_url().expect("url"), "https://api.stepfun.com");
//! assert_eq!(config.chat.max_tool_rounds, 4);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::Deserialize;
use sfchat::{ChatOptions, DEFAULT_MAX_TOOL_ROUNDS};
use sfprovider::{ApiKey, DEFAULT_BASE_URL, RetryPolicy};

pub const API_KEY_ENV: &str = "STEPFUN_API_KEY";
pub const BASE_URL_ENV: &str = "STEPFUN_BASE_URL";
pub const CHAT_MODEL_ENV: &str = "STEPFUN_CHAT_MODEL";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    MissingApiKey,
    MissingBaseUrl,
    InvalidOptions,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_api_key(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::MissingApiKey, message)
    }

    pub fn missing_base_url(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::MissingBaseUrl, message)
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidOptions, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Transport, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// A disabled chat section yields no client.
    pub enabled: bool,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Overlaid on the library defaults.
    pub options: ChatOptions,
    pub max_tool_rounds: u32,
    pub retry: RetryConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            api_key: None,
            options: ChatOptions::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StepFunConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Installs panic-isolated tracing hooks on every layer.
    pub tracing: bool,
    pub chat: ChatConfig,
}

impl Default for StepFunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            tracing: true,
            chat: ChatConfig::default(),
        }
    }
}

impl StepFunConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from `STEPFUN_*` variables resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(api_key) = lookup(API_KEY_ENV) {
            config.api_key = Some(api_key);
        }
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(model) = lookup(CHAT_MODEL_ENV) {
            config.chat.options.model = Some(model);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_chat_options(mut self, options: ChatOptions) -> Self {
        self.chat.options = options;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Chat-level base URL when set, otherwise the connection-level one.
    pub fn effective_base_url(&self) -> Result<String, ConfigError> {
        first_non_blank(self.chat.base_url.as_deref(), Some(&self.base_url))
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| ConfigError::missing_base_url("StepFun base URL must be set"))
    }

    /// Chat-level API key when set, otherwise the connection-level one.
    pub fn effective_api_key(&self) -> Result<ApiKey, ConfigError> {
        first_non_blank(self.chat.api_key.as_deref(), self.api_key.as_deref())
            .map(ApiKey::new)
            .ok_or_else(|| ConfigError::missing_api_key("StepFun API key must be set"))
    }

    /// Library defaults overlaid with the configured chat options.
    pub fn default_options(&self) -> Result<ChatOptions, ConfigError> {
        let options = ChatOptions::stepfun_defaults().overlay(&self.chat.options);
        options
            .validate()
            .map_err(|err| ConfigError::invalid_options(err.message))?;
        Ok(options)
    }
}

fn first_non_blank<'a>(preferred: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
}
