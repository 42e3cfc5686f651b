//! The `Provider` facade: pick an endpoint, send with retry, return the reply.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ProviderConfig, RequestConfig};
use crate::directory::EndpointDirectory;
use crate::endpoint::{resolve_fallback, Endpoint};
use crate::error::{DiscoveryError, RpcError};
use crate::filter::CredentialFilter;
use crate::policy::{RandomSelection, RetryConfig, RetrySender, SelectionPolicy};
use crate::pool::{EndpointPool, EndpointSource};
use crate::request::JsonRpcResponse;
use crate::transport::{HttpSender, JsonRpcTransport};

/// JSON-RPC client that spreads calls over a pool of equivalent endpoints.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and calls are
/// fully independent.
pub struct Provider {
    chain_id: u64,
    pool: EndpointPool,
    transport: JsonRpcTransport,
}

impl Provider {
    /// Start building a provider that sends through `sender`.
    pub fn builder(sender: Arc<dyn HttpSender>) -> ProviderBuilder {
        ProviderBuilder::new(sender)
    }

    /// Send `method` to one pool endpoint and return the decoded envelope.
    ///
    /// Node-side error objects come back inside the response, not as `Err`.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<JsonRpcResponse, RpcError> {
        let endpoint = self.pool.select();
        tracing::debug!(url = %endpoint, method, "making request");
        let resp = self.transport.send(endpoint, method, params).await?;
        tracing::debug!(
            url = %endpoint,
            method,
            id = %resp.id,
            ok = resp.is_ok(),
            "received response"
        );
        Ok(resp)
    }

    /// Like [`Provider::call`], but raises node errors and deserializes `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let result = self
            .call(method, params)
            .await?
            .into_result()
            .map_err(RpcError::Rpc)?;
        serde_json::from_value(result).map_err(RpcError::Result)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    /// The configured fallback endpoint.
    pub fn endpoint_uri(&self) -> &Endpoint {
        self.pool.fallback()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC connection {}", self.endpoint_uri())
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("chain_id", &self.chain_id)
            .field("pool", &self.pool)
            .finish()
    }
}

/// Builder for [`Provider`]. Discovery runs once, inside [`ProviderBuilder::build`].
pub struct ProviderBuilder {
    config: ProviderConfig,
    sender: Arc<dyn HttpSender>,
    directory: Option<Arc<dyn EndpointDirectory>>,
    selection: Option<Arc<dyn SelectionPolicy>>,
    filter: CredentialFilter,
}

impl ProviderBuilder {
    pub fn new(sender: Arc<dyn HttpSender>) -> Self {
        Self {
            config: ProviderConfig::default(),
            sender,
            directory: None,
            selection: None,
            filter: CredentialFilter::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    /// Fallback endpoint used when discovery yields nothing.
    pub fn endpoint(mut self, uri: impl Into<String>) -> Self {
        self.config.endpoint = Some(uri.into());
        self
    }

    pub fn request_config(mut self, request: RequestConfig) -> Self {
        self.config.request = request;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.config.discovery_timeout = timeout;
        self
    }

    /// Directory consulted once at build time. Without one the pool is
    /// fallback-only.
    pub fn directory(mut self, directory: Arc<dyn EndpointDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Selection strategy; uniform random if unset.
    pub fn selection(mut self, policy: Arc<dyn SelectionPolicy>) -> Self {
        self.selection = Some(policy);
        self
    }

    /// Denylist applied to every discovered endpoint before it enters the
    /// pool, whatever the directory already filtered.
    pub fn credential_filter(mut self, filter: CredentialFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Resolve the fallback, run discovery, and assemble the provider.
    ///
    /// Fails only if the fallback endpoint is invalid; discovery problems
    /// degrade to a fallback-only pool.
    pub async fn build(self) -> Result<Provider, RpcError> {
        let chain_id = self.config.chain_id;
        let fallback = resolve_fallback(self.config.endpoint.as_deref())?;

        let mut discovered = match &self.directory {
            Some(dir) => discover(dir.as_ref(), chain_id, self.config.discovery_timeout).await,
            None => Vec::new(),
        };
        let before = discovered.len();
        discovered.retain(|ep| !self.filter.is_denied(ep.as_str()));
        if discovered.len() < before {
            tracing::warn!(
                chain_id,
                dropped = before - discovered.len(),
                "directory returned credential-gated endpoints"
            );
        }
        let source = EndpointSource::new(discovered, fallback);
        let policy = self
            .selection
            .unwrap_or_else(|| Arc::new(RandomSelection::new()));
        let pool = EndpointPool::new(source, policy);

        tracing::info!(
            chain_id,
            discovered = pool.len(),
            fallback = %pool.fallback(),
            policy = pool.policy_name(),
            "provider ready"
        );

        let sender: Arc<dyn HttpSender> =
            Arc::new(RetrySender::new(self.sender, self.config.retry));
        let transport = JsonRpcTransport::new(sender, Arc::new(self.config.request));

        Ok(Provider {
            chain_id,
            pool,
            transport,
        })
    }
}

/// Run discovery under `timeout`. Any failure yields an empty list.
async fn discover(dir: &dyn EndpointDirectory, chain_id: u64, timeout: Duration) -> Vec<Endpoint> {
    let result = match tokio::time::timeout(timeout, dir.fetch(chain_id)).await {
        Ok(result) => result,
        Err(_) => Err(DiscoveryError::Timeout {
            ms: timeout.as_millis() as u64,
        }),
    };
    match result {
        Ok(endpoints) => {
            tracing::debug!(
                chain_id,
                directory = dir.name(),
                count = endpoints.len(),
                "discovered endpoints"
            );
            endpoints
        }
        Err(e) => {
            tracing::warn!(
                chain_id,
                directory = dir.name(),
                error = %e,
                "endpoint discovery failed, using fallback only"
            );
            Vec::new()
        }
    }
}
