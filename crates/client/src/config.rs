use std::time::Duration;

use reqwest::Url;
use upbreed_core::pagination::DEFAULT_PAGE_LIMIT;

/// Default search debounce used by list screens.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 1000;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against an API
/// on `localhost:3000`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the admin API (default: `http://localhost:3000`).
    pub base_url: Url,
    /// Per-request timeout; a hung request settles as an error after this.
    pub request_timeout: Duration,
    /// Items per page on list screens (default: `9`).
    pub page_limit: u32,
    /// Quiet period before a typed search term is applied (default: 1s).
    pub search_debounce: Duration,
}

impl ClientConfig {
    /// A config pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `API_BASE_URL`         | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `PAGE_LIMIT`           | `9`                     |
    /// | `SEARCH_DEBOUNCE_MS`   | `1000`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            var: "API_BASE_URL",
            reason: e.to_string(),
        })?;

        let request_timeout_secs: u64 =
            parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let page_limit: u32 = parse_env("PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        let search_debounce_ms: u64 = parse_env("SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            page_limit,
            search_debounce: Duration::from_millis(search_debounce_ms),
        })
    }
}

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new(Url::parse("http://api.test").unwrap());
        assert_eq!(config.page_limit, 9);
        assert_eq!(config.search_debounce, Duration::from_millis(1000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn parse_env_falls_back_when_unset() {
        let value: u64 = parse_env("UPBREED_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
