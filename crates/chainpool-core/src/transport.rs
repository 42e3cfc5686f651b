//! JSON-RPC over HTTP: the `HttpSender` seam and the encoding/decoding
//! transport layered on top of it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::RequestConfig;
use crate::endpoint::Endpoint;
use crate::error::{RpcError, TransportError};
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// Header name → value. Ordered so requests are reproducible in tests.
pub type Headers = BTreeMap<String, String>;

/// One encoded POST, ready to be (re)sent verbatim.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub body: Vec<u8>,
    pub headers: Headers,
    /// JSON-RPC method encoded in `body`; lets middleware decide per method.
    pub rpc_method: String,
    /// Per-request timeout, if configured.
    pub timeout: Option<Duration>,
}

/// The raw "POST bytes, get bytes" capability.
///
/// Implementations own connection pooling, TLS, and timeouts. A non-success
/// HTTP status must be reported as [`TransportError::Status`].
#[async_trait]
pub trait HttpSender: Send + Sync + 'static {
    async fn post(&self, req: &HttpRequest) -> Result<Vec<u8>, TransportError>;
}

/// Client identification sent with every request.
pub fn user_agent() -> String {
    format!("chainpool/{} (JsonRpcTransport)", env!("CARGO_PKG_VERSION"))
}

/// Encodes calls, exchanges them through an [`HttpSender`], decodes replies.
pub struct JsonRpcTransport {
    sender: Arc<dyn HttpSender>,
    config: Arc<RequestConfig>,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(sender: Arc<dyn HttpSender>, config: Arc<RequestConfig>) -> Self {
        Self {
            sender,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    /// Headers attached to every request: defaults overlaid with configured ones.
    pub fn request_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".into(), "application/json".into());
        headers.insert("User-Agent".into(), user_agent());
        for (name, value) in &self.config.headers {
            // Header names are case-insensitive; replace a default regardless of case.
            headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Build the wire request for `method`, assigning the next request id.
    pub fn encode(
        &self,
        endpoint: &Endpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Result<HttpRequest, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params)
            .encode()
            .map_err(RpcError::Encode)?;
        Ok(HttpRequest {
            url: endpoint.as_str().to_string(),
            body,
            headers: self.request_headers(),
            rpc_method: method.to_string(),
            timeout: self.config.timeout,
        })
    }

    /// Send one call to `endpoint` and decode the envelope.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Result<JsonRpcResponse, RpcError> {
        let req = self.encode(endpoint, method, params)?;
        let raw = self.sender.post(&req).await?;
        Ok(JsonRpcResponse::decode(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use std::sync::Mutex;

    struct CannedSender {
        body: &'static [u8],
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl HttpSender for CannedSender {
        async fn post(&self, req: &HttpRequest) -> Result<Vec<u8>, TransportError> {
            self.seen.lock().unwrap().push(req.clone());
            Ok(self.body.to_vec())
        }
    }

    fn canned(body: &'static [u8]) -> Arc<CannedSender> {
        Arc::new(CannedSender {
            body,
            seen: Mutex::new(vec![]),
        })
    }

    fn endpoint() -> Endpoint {
        Endpoint::parse("https://rpc.example.com").unwrap()
    }

    #[tokio::test]
    async fn block_number_round_trip() {
        let sender = canned(br#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#);
        let transport = JsonRpcTransport::new(sender.clone(), Arc::new(RequestConfig::default()));

        let resp = transport.send(&endpoint(), "eth_blockNumber", vec![]).await.unwrap();
        assert_eq!(resp.result, Some(Value::String("0x10".into())));
        assert!(resp.error.is_none());

        let seen = sender.seen.lock().unwrap();
        let sent: Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(sent["method"], "eth_blockNumber");
        assert_eq!(sent["params"], serde_json::json!([]));
        assert_eq!(sent["id"], 1);
        assert_eq!(seen[0].url, "https://rpc.example.com");
    }

    #[tokio::test]
    async fn ids_increase_per_call() {
        let sender = canned(br#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#);
        let transport = JsonRpcTransport::new(sender.clone(), Arc::new(RequestConfig::default()));
        for _ in 0..3 {
            transport.send(&endpoint(), "eth_chainId", vec![]).await.unwrap();
        }
        let ids: Vec<u64> = sender
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap()["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let sender = canned(b"upstream connect error");
        let transport = JsonRpcTransport::new(sender, Arc::new(RequestConfig::default()));
        let err = transport.send(&endpoint(), "eth_blockNumber", vec![]).await.unwrap_err();
        assert!(matches!(err, RpcError::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn default_headers_present() {
        let transport = JsonRpcTransport::new(canned(b"{}"), Arc::new(RequestConfig::default()));
        let headers = transport.request_headers();
        assert_eq!(headers["Content-Type"], "application/json");
        assert!(headers["User-Agent"].starts_with("chainpool/"));
    }

    #[test]
    fn configured_headers_override_defaults() {
        let config = RequestConfig::default()
            .with_header("content-type", "application/json; charset=utf-8")
            .with_header("X-Client", "indexer");
        let transport = JsonRpcTransport::new(canned(b"{}"), Arc::new(config));
        let headers = transport.request_headers();
        assert!(!headers.contains_key("Content-Type"));
        assert_eq!(headers["content-type"], "application/json; charset=utf-8");
        assert_eq!(headers["X-Client"], "indexer");
        assert!(headers.contains_key("User-Agent"));
    }
}
