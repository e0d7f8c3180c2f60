//! Runtime configuration, read from the environment.

use almanac::{Almanac, ClientOptions, DEFAULT_USER_AGENT};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Client error: {0}")]
    Client(#[from] almanac::Error),
}

/// Settings for the HTTP client and the record store.
#[derive(Debug, Clone)]
pub struct QueryDayConfig {
    pub tmdb_api_key: Option<String>,
    pub state_dir: PathBuf,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for QueryDayConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            state_dir: default_state_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl QueryDayConfig {
    /// Read every setting from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read every setting through `lookup`; unset keys fall back to defaults.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let tmdb_api_key = var("TMDB_API_KEY");
        if tmdb_api_key.is_none() {
            info!("TMDB_API_KEY not set, movie facts will use fallbacks");
        }

        let state_dir = var("QUERYDAY_STATE_DIR").map(PathBuf::from).unwrap_or_else(|| {
            info!(
                "QUERYDAY_STATE_DIR not set, using default: {}",
                defaults.state_dir.display()
            );
            defaults.state_dir.clone()
        });

        let user_agent = var("QUERYDAY_USER_AGENT").unwrap_or(defaults.user_agent);

        let http_timeout = Duration::from_secs(parse_or(
            "QUERYDAY_HTTP_TIMEOUT_SECS",
            var("QUERYDAY_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let connect_timeout = Duration::from_secs(parse_or(
            "QUERYDAY_CONNECT_TIMEOUT_SECS",
            var("QUERYDAY_CONNECT_TIMEOUT_SECS"),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?);

        Ok(Self {
            tmdb_api_key,
            state_dir,
            user_agent,
            http_timeout,
            connect_timeout,
        })
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn with_tmdb_api_key(mut self, key: impl Into<String>) -> Self {
        self.tmdb_api_key = Some(key.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.http_timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Build the HTTP client these settings describe.
    pub fn build_almanac(&self) -> Result<Almanac, ConfigError> {
        let almanac = Almanac::with_options(self.client_options())?;
        Ok(match &self.tmdb_api_key {
            Some(key) => almanac.with_tmdb_api_key(key.clone()),
            None => almanac,
        })
    }
}

/// `$XDG_DATA_HOME/queryday`, or `./.queryday` without a data directory.
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("queryday"))
        .unwrap_or_else(|| PathBuf::from(".queryday"))
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
