//! Provider configuration. Immutable once a provider is built.

use std::time::Duration;

use crate::endpoint::ENDPOINT_ENV_VAR;
use crate::policy::RetryConfig;
use crate::transport::Headers;

/// Environment variable holding the chain id for [`ProviderConfig::from_env`].
pub const CHAIN_ID_ENV_VAR: &str = "CHAINPOOL_CHAIN_ID";

/// Per-request transport settings, shared read-only by every call.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Extra headers; these override the defaults on name collision.
    pub headers: Headers,
    /// Per-request timeout passed to the sender.
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Everything a [`crate::Provider`] needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Chain whose endpoints are discovered.
    pub chain_id: u64,
    /// Fallback endpoint. `None` resolves through the environment, then the default.
    pub endpoint: Option<String>,
    pub request: RequestConfig,
    pub retry: RetryConfig,
    /// Upper bound on endpoint discovery during construction.
    pub discovery_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            endpoint: None,
            request: RequestConfig::default(),
            retry: RetryConfig::default(),
            discovery_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Read `CHAINPOOL_CHAIN_ID` and `CHAINPOOL_HTTP_PROVIDER_URI`.
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(chain_id) = std::env::var(CHAIN_ID_ENV_VAR)
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.chain_id = chain_id;
        }
        config.endpoint = std::env::var(ENDPOINT_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty());
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.chain_id, 1);
        assert!(config.endpoint.is_none());
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.discovery_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_methods() {
        let config = ProviderConfig::new(42161)
            .with_endpoint("https://arb1.example.com")
            .with_request(RequestConfig::default().with_timeout(Duration::from_secs(3)))
            .with_retry(RetryConfig::immediate(2))
            .with_discovery_timeout(Duration::from_millis(500));
        assert_eq!(config.chain_id, 42161);
        assert_eq!(config.endpoint.as_deref(), Some("https://arb1.example.com"));
        assert_eq!(config.request.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.discovery_timeout, Duration::from_millis(500));
    }
}
