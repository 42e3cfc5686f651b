//! `HttpSender` backed by a shared `reqwest::Client`.

use std::time::Duration;

use async_trait::async_trait;

use chainpool_core::error::TransportError;
use chainpool_core::transport::{HttpRequest, HttpSender};

/// Default whole-request timeout for clients built by [`ReqwestSender::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts JSON-RPC bodies over a pooled `reqwest::Client`.
///
/// The client is created once and shared by every call; cloning the sender
/// shares the same connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestSender {
    /// Build a client with the given whole-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            timeout: Some(timeout),
        })
    }

    /// Reuse an externally configured client (proxies, TLS roots, pools).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self {
            http,
            timeout: None,
        }
    }

    fn classify(&self, err: reqwest::Error, req: &HttpRequest) -> TransportError {
        if err.is_timeout() {
            let ms = req
                .timeout
                .or(self.timeout)
                .map(|t| t.as_millis() as u64)
                .unwrap_or_default();
            TransportError::Timeout { ms }
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::Other(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn post(&self, req: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = self.http.post(&req.url).body(req.body.clone());
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = req.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(|e| self.classify(e, req))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let bytes = resp.bytes().await.map_err(|e| self.classify(e, req))?;
        Ok(bytes.to_vec())
    }
}
