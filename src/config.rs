use dotenv::dotenv;
use std::{env, fmt, str::FromStr};

/// Netlify caps synchronous function payloads at 6 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("LOG_FORMAT must be `compact` or `json`, got {0:?}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Everything the relay needs at invocation time. Built once at startup and
/// handed to [`crate::relay::SignedRelay`], so handlers never touch the
/// process environment.
#[derive(Clone, Default)]
pub struct RelayConfig {
    /// HMAC key. Empty when unset; signing still proceeds.
    pub secret: String,
    /// Downstream base URL. Not validated here.
    pub base_url: String,
}

impl RelayConfig {
    pub fn new(secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            secret: env::var("AGENT_HMAC_SECRET").unwrap_or_default(),
            base_url: env::var("N8N_WEBHOOK_BASE").unwrap_or_default(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("RelayConfig")
            .field("secret", &secret)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub worker_threads: usize,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
    pub relay: RelayConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            worker_threads: parse_var("WORKER_THREADS", num_cpus::get())?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            log_format: env::var("LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .unwrap_or(Ok(LogFormat::Compact))?,
            relay: RelayConfig::from_env(),
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(default),
    }
}
