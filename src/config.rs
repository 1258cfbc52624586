//! Environment configuration
//!
//! Read once at startup. A missing API key is fatal.

use crate::api::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};
use crate::error::ConfigurationError;
use crate::gemini::{GeminiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiSettings,
    pub port: u16,
    /// Address share links are built on
    pub public_base_url: String,
    /// Optional JSON catalog with non-English UI strings
    pub translations_path: Option<PathBuf>,
    /// API sessions untouched this long are evicted
    pub session_idle: Duration,
    pub max_sessions: usize,
}

impl AppConfig {
    /// Load from the process environment (after `.env`, if any)
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenv::dotenv().ok();
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let api_key = get("API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .ok_or_else(|| ConfigurationError::MissingVariable("API_KEY".to_string()))?;

        let positive = |name: &str, default: u64| match get(name) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigurationError::InvalidValue {
                    name: name.to_string(),
                    value: raw,
                }),
            },
            None => Ok(default),
        };

        let timeout = Duration::from_secs(positive(
            "PROVIDER_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        )?);
        let session_idle = Duration::from_secs(positive(
            "SESSION_IDLE_SECS",
            DEFAULT_SESSION_IDLE.as_secs(),
        )?);
        let max_sessions = positive("MAX_SESSIONS", DEFAULT_MAX_SESSIONS as u64)? as usize;

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigurationError::InvalidValue {
                name: "PORT".to_string(),
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let public_base_url =
            get("PUBLIC_BASE_URL").unwrap_or_else(|| format!("http://127.0.0.1:{}/", port));

        Ok(Self {
            gemini: GeminiSettings {
                api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout,
            },
            port,
            public_base_url,
            translations_path: get("TRANSLATIONS_PATH").map(PathBuf::from),
            session_idle,
            max_sessions,
        })
    }
}
