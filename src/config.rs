use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_STATUS_URL: &str = "https://lmguide.grenergy.com";

/// How the status page is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET; sees only server-rendered markup.
    Http,
    /// Headless Chromium; waits for client-side rendering to settle.
    Browser,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub status_url: String,
    pub gauge_url: Option<String>,
    pub webhook_url: Option<String>,
    pub require_webhook: bool,
    pub step_output: Option<PathBuf>,
    pub fetch_mode: FetchMode,
    pub fetch_timeout: Duration,
    pub render_wait: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            status_url: DEFAULT_STATUS_URL.to_string(),
            gauge_url: None,
            webhook_url: None,
            require_webhook: false,
            step_output: None,
            fetch_mode: FetchMode::Http,
            fetch_timeout: Duration::from_secs(30),
            render_wait: Duration::from_secs(5),
            user_agent: concat!("lmguide-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let fetch_mode = match get("FETCH_MODE").as_deref() {
            None | Some("http") => FetchMode::Http,
            Some("browser") => FetchMode::Browser,
            Some(other) => {
                return Err(AppError::ConfigError(format!(
                    "Invalid FETCH_MODE '{}': expected 'http' or 'browser'",
                    other
                )));
            }
        };
        if fetch_mode == FetchMode::Browser && !cfg!(feature = "browser") {
            return Err(AppError::ConfigError(
                "FETCH_MODE=browser requires building with the 'browser' feature".to_string(),
            ));
        }

        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("FETCH_TIMEOUT_SECS", &v)?),
            None => defaults.fetch_timeout,
        };
        if fetch_timeout.is_zero() {
            return Err(AppError::ConfigError("FETCH_TIMEOUT_SECS must be positive".to_string()));
        }
        let render_wait = match get("RENDER_WAIT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("RENDER_WAIT_SECS", &v)?),
            None => defaults.render_wait,
        };

        let require_webhook = match get("REQUIRE_WEBHOOK") {
            Some(v) => parse_bool("REQUIRE_WEBHOOK", &v)?,
            None => false,
        };

        Ok(Config {
            status_url: get("LMGUIDE_URL").unwrap_or(defaults.status_url),
            gauge_url: get("GAUGE_URL"),
            webhook_url: get("TRMNL_WEBHOOK_URL"),
            require_webhook,
            step_output: get("GITHUB_OUTPUT").map(PathBuf::from),
            fetch_mode,
            fetch_timeout,
            render_wait,
            user_agent: get("USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(AppError::ConfigError(format!("Invalid {}: '{}'", key, value))),
    }
}
