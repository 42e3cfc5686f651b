//! Error taxonomy for discovery, transport, decoding and the provider facade.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Endpoint discovery failed. Never reaches callers of `Provider::call`;
/// the provider degrades to its fallback endpoint instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Directory request failed at the network level.
    #[error("directory request failed: {0}")]
    Http(String),

    /// Directory answered with a non-success status.
    #[error("directory returned HTTP {status}")]
    Status { status: u16 },

    /// Directory body is not valid JSON.
    #[error("directory response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The endpoint list was not found at the expected path.
    #[error("directory response has no endpoint list at `{pointer}`")]
    MissingField { pointer: String },

    /// Discovery did not finish within the configured budget.
    #[error("discovery timed out after {ms}ms")]
    Timeout { ms: u64 },
}

/// Errors produced while exchanging bytes with an endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// Request timed out.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Any other HTTP-level failure (reset, truncated body, redirects).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A failure the transport knows is permanent.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if the same request may succeed on an immediate resend.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout { .. } | Self::Http(_) => true,
            Self::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            Self::Other(_) => false,
        }
    }
}

/// The response body could not be read as a JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response envelope is missing `{0}`")]
    MissingField(&'static str),

    #[error("response envelope has neither `result` nor `error`")]
    MissingOutcome,
}

/// Errors surfaced by [`crate::Provider`].
#[derive(Debug, Error)]
pub enum RpcError {
    /// Network failure, after retries were exhausted.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed response body. Not retried.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// A configured endpoint URI is not usable.
    #[error("invalid endpoint `{uri}`: {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    /// Node-side error object, raised only by the typed `request` helper.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The `result` value did not match the requested type.
    #[error("unexpected result shape: {0}")]
    Result(#[source] serde_json::Error),
}

impl RpcError {
    /// Returns `true` if this is a node-side execution error.
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(TransportError::Connect("refused".into()).is_transient());
        assert!(TransportError::Timeout { ms: 100 }.is_transient());
        assert!(TransportError::Http("reset".into()).is_transient());
        assert!(TransportError::Status { status: 503, body: String::new() }.is_transient());
        assert!(TransportError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!TransportError::Status { status: 401, body: String::new() }.is_transient());
        assert!(!TransportError::Other("bad url".into()).is_transient());
    }
}
