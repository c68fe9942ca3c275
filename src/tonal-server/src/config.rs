//! Server configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tonal_core::palette::DEFAULT_STEP;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tone step used when a palette request has no `step` query.
    #[serde(default = "default_step")]
    pub default_step: u16,

    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// CORS origins (empty = allow all).
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_step() -> u16 {
    DEFAULT_STEP
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_step: default_step(),
            rate_limit: RateLimitConfig::default(),
            cors_origins: vec![],
            logging: LoggingConfig::default(),
            request_timeout: default_request_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of this configuration.
    pub fn with_env(mut self) -> anyhow::Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Recognized keys: `PORT`, `HOST`, `TONAL_DEFAULT_STEP`,
    /// `TONAL_RATE_LIMIT_ENABLED`, `TONAL_RATE_LIMIT_MAX`,
    /// `TONAL_RATE_LIMIT_WINDOW_SECS`, `TONAL_TRUST_PROXY`,
    /// `TONAL_CORS_ORIGINS` (comma-separated), `TONAL_LOG_LEVEL`,
    /// `TONAL_LOG_FORMAT`.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(port) = lookup("PORT") {
            self.port = parse_var("PORT", &port)?;
        }

        if let Some(host) = lookup("HOST") {
            self.host = host;
        }

        if let Some(step) = lookup("TONAL_DEFAULT_STEP") {
            self.default_step = parse_var("TONAL_DEFAULT_STEP", &step)?;
        }

        if let Some(enabled) = lookup("TONAL_RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = parse_var("TONAL_RATE_LIMIT_ENABLED", &enabled)?;
        }

        if let Some(max) = lookup("TONAL_RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = parse_var("TONAL_RATE_LIMIT_MAX", &max)?;
        }

        if let Some(window) = lookup("TONAL_RATE_LIMIT_WINDOW_SECS") {
            self.rate_limit.window_secs = parse_var("TONAL_RATE_LIMIT_WINDOW_SECS", &window)?;
        }

        if let Some(trust) = lookup("TONAL_TRUST_PROXY") {
            self.rate_limit.trust_proxy = parse_var("TONAL_TRUST_PROXY", &trust)?;
        }

        if let Some(origins) = lookup("TONAL_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(level) = lookup("TONAL_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("TONAL_LOG_FORMAT") {
            self.logging.format = parse_var("TONAL_LOG_FORMAT", &format)?;
        }

        self.validate()
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_step == 0 {
            bail!("default_step must be greater than zero");
        }
        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            bail!("rate_limit.max_requests must be greater than zero");
        }
        if self.rate_limit.window_secs == 0 {
            bail!("rate_limit.window_secs must be greater than zero");
        }
        Ok(())
    }

    /// Socket address built from `host` and `port`.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("invalid listen address: {addr}"))
    }

    /// Get request timeout as Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

fn parse_var<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {key} ({value:?}): {e}"))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per client within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Trust proxy headers (X-Forwarded-For, X-Real-IP) for client IP detection.
    /// Enable this when running behind a reverse proxy.
    #[serde(default)]
    pub trust_proxy: bool,
    /// Exempt paths from rate limiting.
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

fn default_max_requests() -> u32 {
    150
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_exempt_paths() -> Vec<String> {
    vec!["/api/health".to_string()]
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_proxy: false,
            exempt_paths: default_exempt_paths(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window as Duration.
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other} (expected pretty or json)")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 10000);
        assert_eq!(config.default_step, 100);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.max_requests, 150);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:10000");
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port, parsed.port);
        assert_eq!(config.logging.format, parsed.logging.format);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: ServerConfig = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(parsed.port, 8080);
        assert_eq!(parsed.host, "0.0.0.0");
        assert_eq!(parsed.rate_limit.exempt_paths, vec!["/api/health".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_vars(vars(&[
                ("PORT", "3000"),
                ("HOST", "127.0.0.1"),
                ("TONAL_DEFAULT_STEP", "50"),
                ("TONAL_RATE_LIMIT_MAX", "10"),
                ("TONAL_CORS_ORIGINS", "https://a.example, https://b.example,"),
                ("TONAL_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.default_step, 50);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = ServerConfig::default();
        let err = config.apply_vars(vars(&[("PORT", "ten")])).unwrap_err();
        assert!(err.to_string().contains("PORT"), "{err}");
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = ServerConfig::default();
        assert!(config.apply_vars(vars(&[("TONAL_DEFAULT_STEP", "0")])).is_err());
    }
}
