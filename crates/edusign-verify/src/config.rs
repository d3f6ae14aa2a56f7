//! Verification gateway configuration.
//!
//! Points at the trust authority's verify endpoint. Defaults target a local
//! authority sidecar; override via environment variables or explicit
//! construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the trust authority client.
///
/// Custom `Debug` implementation redacts the `api_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct VerifyConfig {
    /// Full URL of the verify endpoint (requests are POSTed here as-is).
    pub verify_url: Url,
    /// Optional bearer token presented to the authority.
    pub api_key: Option<Zeroizing<String>>,
    /// Request timeout in seconds. Covers connect, send and body read.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("verify_url", &self.verify_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VerifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EDUSIGN_VERIFY_URL` (default: `http://127.0.0.1:8001/verify`)
    /// - `EDUSIGN_VERIFY_API_KEY` (optional)
    /// - `EDUSIGN_VERIFY_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let verify_url = env_url("EDUSIGN_VERIFY_URL", "http://127.0.0.1:8001/verify")?;
        let api_key = std::env::var("EDUSIGN_VERIFY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Zeroizing::new);
        let timeout_secs = match std::env::var("EDUSIGN_VERIFY_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            verify_url,
            api_key,
            timeout_secs,
        })
    }

    /// Create a configuration for an explicit endpoint with the default
    /// timeout and no credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `url` cannot be parsed.
    pub fn for_url(url: &str) -> Result<Self, ConfigError> {
        let verify_url = Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl("verify_url".to_string(), e.to_string()))?;
        Ok(Self {
            verify_url,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Override the timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Attach a bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Zeroizing::new(key.into()));
        self
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("EDUSIGN_VERIFY_TIMEOUT_SECS must be a positive integer, got \"{0}\"")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_url_uses_default_timeout() {
        let cfg = VerifyConfig::for_url("http://127.0.0.1:9000/api/v1/verify").unwrap();
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.verify_url.path(), "/api/v1/verify");
    }

    #[test]
    fn for_url_rejects_garbage() {
        assert!(VerifyConfig::for_url("not a url").is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = VerifyConfig::for_url("https://pki.example.kz/verify")
            .unwrap()
            .with_api_key("super-secret");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("NONEXISTENT_VAR_EDUSIGN_1", "https://example.com/verify").unwrap();
        assert_eq!(url.as_str(), "https://example.com/verify");
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout("15").unwrap(), 15);
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }
}
