//! Endpoint discovery from chainlist.org page data.
//!
//! Chainlist publishes, per chain, a JSON document whose
//! `pageProps.chain.rpc` array lists public RPC URLs with tracking metadata:
//!
//! ```json
//! { "pageProps": { "chain": { "rpc": [ { "url": "https://...", "tracking": "none" } ] } } }
//! ```
//!
//! The page-data URL embeds a site build id that changes on redeploys, so
//! both the URL template and the JSON pointer are configurable.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use chainpool_core::directory::EndpointDirectory;
use chainpool_core::endpoint::Endpoint;
use chainpool_core::error::DiscoveryError;
use chainpool_core::filter::{filter_candidates, CredentialFilter};

/// Page-data URL; `{chain_id}` is substituted per fetch.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://chainlist.org/_next/data/3UduBZYW7UVz5riivJmbG/chain/{chain_id}.json?chain={chain_id}";

/// Location of the RPC list inside the page data.
pub const DEFAULT_RPC_POINTER: &str = "/pageProps/chain/rpc";

/// [`EndpointDirectory`] backed by chainlist.org.
#[derive(Debug, Clone)]
pub struct ChainlistDirectory {
    client: reqwest::Client,
    url_template: String,
    rpc_pointer: String,
    filter: CredentialFilter,
}

/// Timeout of the client built by [`ChainlistDirectory::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent of the client built by [`ChainlistDirectory::new`].
pub const USER_AGENT: &str = concat!("chainpool/", env!("CARGO_PKG_VERSION"), " (ChainlistDirectory)");

impl ChainlistDirectory {
    /// Directory with its own client ([`DEFAULT_TIMEOUT`], [`USER_AGENT`]).
    pub fn new() -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DiscoveryError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::from_client(client))
    }

    /// Share a client with the RPC sender instead of building a new one.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            url_template: DEFAULT_URL_TEMPLATE.into(),
            rpc_pointer: DEFAULT_RPC_POINTER.into(),
            filter: CredentialFilter::default(),
        }
    }

    /// Set the URL template. `{chain_id}` is replaced with the requested chain.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Set the JSON pointer (RFC 6901) to the RPC list.
    pub fn with_rpc_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.rpc_pointer = pointer.into();
        self
    }

    pub fn with_filter(mut self, filter: CredentialFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Directory URL for `chain_id`.
    pub fn url_for(&self, chain_id: u64) -> String {
        self.url_template
            .replace("{chain_id}", &chain_id.to_string())
    }
}

#[async_trait]
impl EndpointDirectory for ChainlistDirectory {
    async fn fetch(&self, chain_id: u64) -> Result<Vec<Endpoint>, DiscoveryError> {
        let url = self.url_for(chain_id);
        tracing::debug!(chain_id, url = %url, "fetching endpoint directory");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DiscoveryError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;
        let endpoints = parse_endpoints(&body, &self.rpc_pointer, &self.filter)?;
        tracing::debug!(chain_id, count = endpoints.len(), "endpoint directory parsed");
        Ok(endpoints)
    }

    fn name(&self) -> &str {
        "chainlist"
    }
}

/// Extract and filter endpoint URLs from a directory document.
///
/// Entries may be `{ "url": ... }` objects or bare strings; anything else is
/// skipped.
pub fn parse_endpoints(
    body: &[u8],
    pointer: &str,
    filter: &CredentialFilter,
) -> Result<Vec<Endpoint>, DiscoveryError> {
    let doc: Value = serde_json::from_slice(body)?;
    let entries = doc
        .pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| DiscoveryError::MissingField {
            pointer: pointer.to_string(),
        })?;

    let urls = entries.iter().filter_map(|entry| match entry {
        Value::String(url) => Some(url.as_str()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str),
        _ => None,
    });
    Ok(filter_candidates(urls, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ChainlistDirectory {
        ChainlistDirectory::from_client(reqwest::Client::new())
    }

    #[test]
    fn url_template_substitutes_chain() {
        let dir = directory().with_url_template("https://dir.example.com/{chain_id}.json?c={chain_id}");
        assert_eq!(dir.url_for(10), "https://dir.example.com/10.json?c=10");
    }

    #[test]
    fn default_url_targets_chainlist() {
        let url = directory().url_for(42161);
        assert!(url.starts_with("https://chainlist.org/"));
        assert!(url.ends_with("/chain/42161.json?chain=42161"));
    }

    #[test]
    fn parse_mixed_entries() {
        let body = br#"{"pageProps":{"chain":{"rpc":[
            {"url":"https://ARB1.example.com/rpc","tracking":"none"},
            "https://public.example.org",
            {"url":"https://rpc.example.com/?apikey=XYZ"},
            {"tracking":"limited"},
            42
        ]}}}"#;
        let eps = parse_endpoints(body, DEFAULT_RPC_POINTER, &CredentialFilter::default()).unwrap();
        let got: Vec<&str> = eps.iter().map(Endpoint::as_str).collect();
        assert_eq!(got, vec!["https://arb1.example.com/rpc", "https://public.example.org"]);
    }

    #[test]
    fn parse_empty_list_is_ok() {
        let body = br#"{"pageProps":{"chain":{"rpc":[]}}}"#;
        let eps = parse_endpoints(body, DEFAULT_RPC_POINTER, &CredentialFilter::default()).unwrap();
        assert!(eps.is_empty());
    }

    #[test]
    fn parse_missing_field() {
        let body = br#"{"pageProps":{}}"#;
        let err = parse_endpoints(body, DEFAULT_RPC_POINTER, &CredentialFilter::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingField { .. }));
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_endpoints(b"<!doctype html>", DEFAULT_RPC_POINTER, &CredentialFilter::default())
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse(_)));
    }
}
