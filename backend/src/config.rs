//! HTTP-side settings
//!
//! Engine settings live in [`stockfish_session::EngineConfig`]; this covers
//! what the request handler itself needs.

use axum::http::HeaderValue;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Move-time budget used when none is configured
pub const DEFAULT_MOVE_TIME: Duration = Duration::from_millis(18_000);

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Budget handed to the engine for every search
    pub move_time: Duration,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: AllowedOrigins,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            move_time: DEFAULT_MOVE_TIME,
            allowed_origins: AllowedOrigins::default(),
        }
    }
}

/// Browser origins accepted by the CORS layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl Default for AllowedOrigins {
    fn default() -> Self {
        Self::List(vec![HeaderValue::from_static("http://localhost:3000")])
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid origin '{0}'")]
    InvalidOrigin(String),

    #[error("No allowed origins given")]
    NoOrigins,
}

impl FromStr for AllowedOrigins {
    type Err = ConfigError;

    /// Comma-separated list; `*` allows any origin
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::NoOrigins);
        }
        if entries.contains(&"*") {
            return Ok(Self::Any);
        }

        entries
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim_end_matches('/'))
                    .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}
