// Client configuration: the backend base URL and request timeout.
// Resolved once at startup and handed to `ApiClient::new`, never re-read.

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted when no `--base-url` flag is given.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Used when neither the flag nor the environment provide a base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme + host + port (and optional path prefix), without trailing `/`.
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config from an explicit base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(ClientConfig {
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }

    /// Resolve the base URL with precedence: command-line flag, then the
    /// value of `API_BASE_URL`, then `DEFAULT_BASE_URL`. Empty values are
    /// treated as absent.
    pub fn resolve(
        flag: Option<&str>,
        env_value: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let chosen = [flag, env_value]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        Self::new(chosen, timeout)
    }

    /// Full URL of an endpoint path such as `/upload`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[test]
    fn flag_wins_over_env_and_default() {
        let cfg = ClientConfig::resolve(
            Some("http://flag:1"),
            Some("http://env:2"),
            timeout(),
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://flag:1");
    }

    #[test]
    fn env_used_when_flag_missing_or_blank() {
        let cfg = ClientConfig::resolve(None, Some("http://env:2"), timeout()).unwrap();
        assert_eq!(cfg.base_url, "http://env:2");

        let cfg = ClientConfig::resolve(Some("  "), Some("http://env:2"), timeout()).unwrap();
        assert_eq!(cfg.base_url, "http://env:2");
    }

    #[test]
    fn falls_back_to_localhost() {
        let cfg = ClientConfig::resolve(None, None, timeout()).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.endpoint("/upload"), "http://localhost:8000/upload");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let cfg = ClientConfig::new("https://api.example.com/v1/", timeout()).unwrap();
        assert_eq!(cfg.endpoint("/analyze"), "https://api.example.com/v1/analyze");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ClientConfig::new("ftp://example.com", timeout()).is_err());
        assert!(ClientConfig::new("localhost:8000", timeout()).is_err());
        assert!(ClientConfig::new("not a url", timeout()).is_err());
    }
}
