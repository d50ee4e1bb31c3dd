//! Server Configuration
//!
//! Read from the environment after `.env` has been loaded. Both service keys
//! are required; everything else has a default.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use agent_core::provider::DEFAULT_MODEL;

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the server needs at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub google_api_key: String,
    pub tavily_api_key: String,
    pub bind_addr: String,
    pub gemini_model: String,
    pub temperature: f32,
    pub static_dir: PathBuf,
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let google_api_key = get(GOOGLE_API_KEY).ok_or(ConfigError::Missing(GOOGLE_API_KEY))?;
        let tavily_api_key = get(TAVILY_API_KEY).ok_or(ConfigError::Missing(TAVILY_API_KEY))?;

        let temperature = match get("GEMINI_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|t| (0.0..=2.0).contains(t))
                .ok_or(ConfigError::Invalid { key: "GEMINI_TEMPERATURE", value: raw })?,
            None => DEFAULT_TEMPERATURE,
        };

        let idle_secs = match get("SESSION_IDLE_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid { key: "SESSION_IDLE_SECS", value: raw })?,
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            google_api_key,
            tavily_api_key,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            temperature,
            static_dir: get("STATIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
            session_idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}
