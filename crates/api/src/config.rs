use anyhow::{Context, Result};
use extract::{GeminiConfig, SpanStrategy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: GeminiConfig,
    pub span_strategy: SpanStrategy,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format '{}' (expected text or json)", other),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl AppConfig {
    /// Load everything from the process environment. A missing API key is fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = GeminiConfig::from_lookup(&lookup)?;

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_addr: lookup("CRICAI_BIND_ADDR").unwrap_or(defaults.bind_addr),
            allowed_origins: lookup("CRICAI_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
        };

        let span_strategy = match lookup("CRICAI_SPAN_STRATEGY") {
            Some(raw) => raw
                .parse::<SpanStrategy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid CRICAI_SPAN_STRATEGY")?,
            None => SpanStrategy::default(),
        };

        let log_format = match lookup("CRICAI_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().context("Invalid CRICAI_LOG_FORMAT")?,
            None => LogFormat::default(),
        };

        Ok(Self {
            server,
            model,
            span_strategy,
            log_format,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
