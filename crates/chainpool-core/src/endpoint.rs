//! The `Endpoint` type and fallback endpoint resolution.

use std::fmt;

use url::Url;

use crate::error::RpcError;

/// Environment variable consulted when no fallback endpoint is configured.
pub const ENDPOINT_ENV_VAR: &str = "CHAINPOOL_HTTP_PROVIDER_URI";

/// Endpoint used when neither configuration nor environment names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";

/// A validated, absolute RPC server URI. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Parse and validate a URI. The original text is kept verbatim.
    pub fn parse(uri: impl Into<String>) -> Result<Self, RpcError> {
        let uri = uri.into();
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(RpcError::InvalidEndpoint {
                uri,
                reason: "empty URI".into(),
            });
        }
        let parsed = Url::parse(trimmed).map_err(|e| RpcError::InvalidEndpoint {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(RpcError::InvalidEndpoint {
                uri,
                reason: "not a network address".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL scheme, lower-cased (`http`, `https`, `wss`, ...).
    pub fn scheme(&self) -> String {
        self.0
            .split_once("://")
            .map(|(s, _)| s.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Returns `true` for endpoints reachable with an HTTP POST.
    pub fn is_http(&self) -> bool {
        matches!(self.scheme().as_str(), "http" | "https")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve the fallback endpoint: explicit value, then [`ENDPOINT_ENV_VAR`],
/// then [`DEFAULT_ENDPOINT`].
pub fn resolve_fallback(configured: Option<&str>) -> Result<Endpoint, RpcError> {
    if let Some(uri) = configured {
        return Endpoint::parse(uri);
    }
    match std::env::var(ENDPOINT_ENV_VAR) {
        Ok(uri) if !uri.trim().is_empty() => Endpoint::parse(uri),
        _ => Endpoint::parse(DEFAULT_ENDPOINT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        let ep = Endpoint::parse("https://rpc.example.com").unwrap();
        assert_eq!(ep.as_str(), "https://rpc.example.com");
        assert!(ep.is_http());
    }

    #[test]
    fn parse_rejects_empty_and_relative() {
        assert!(Endpoint::parse("").is_err());
        assert!(Endpoint::parse("   ").is_err());
        assert!(Endpoint::parse("rpc.example.com").is_err());
        assert!(Endpoint::parse("mailto:ops@example.com").is_err());
    }

    #[test]
    fn websocket_is_not_http() {
        let ep = Endpoint::parse("wss://arb1.example.com/ws").unwrap();
        assert_eq!(ep.scheme(), "wss");
        assert!(!ep.is_http());
    }

    #[test]
    fn explicit_fallback_wins() {
        let ep = resolve_fallback(Some("http://10.0.0.1:8545")).unwrap();
        assert_eq!(ep.as_str(), "http://10.0.0.1:8545");
    }

    #[test]
    fn explicit_fallback_must_be_valid() {
        assert!(matches!(
            resolve_fallback(Some("not a uri")),
            Err(RpcError::InvalidEndpoint { .. })
        ));
    }
}
