//! chainpool-http — production collaborators for `chainpool-core`.
//!
//! - [`ReqwestSender`] — `HttpSender` over a pooled `reqwest::Client`
//! - [`ChainlistDirectory`] — `EndpointDirectory` over chainlist.org
//! - [`connect`] — wire both into a ready [`Provider`]
//!
//! # Usage
//! ```rust,no_run
//! use chainpool_core::ProviderConfig;
//!
//! # async fn run() -> Result<(), chainpool_core::RpcError> {
//! let provider = chainpool_http::connect(ProviderConfig::new(42161)).await?;
//! let block: String = provider.request("eth_blockNumber", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod sender;

use std::sync::Arc;

use chainpool_core::{Provider, ProviderConfig, RpcError};

pub use directory::ChainlistDirectory;
pub use sender::ReqwestSender;

/// Build a provider with a fresh HTTP client and chainlist discovery.
///
/// If the directory client cannot be built the provider starts
/// fallback-only, as for any other discovery failure.
pub async fn connect(config: ProviderConfig) -> Result<Provider, RpcError> {
    let timeout = config.request.timeout.unwrap_or(sender::DEFAULT_TIMEOUT);
    let sender = ReqwestSender::new(timeout)?;
    let builder = Provider::builder(Arc::new(sender)).config(config);
    let builder = match ChainlistDirectory::new() {
        Ok(directory) => builder.directory(Arc::new(directory)),
        Err(e) => {
            tracing::warn!(error = %e, "chainlist directory unavailable, using fallback only");
            builder
        }
    };
    builder.build().await
}

/// Build a provider around an externally supplied client, which is also
/// used for discovery.
pub async fn connect_with_client(
    config: ProviderConfig,
    client: reqwest::Client,
) -> Result<Provider, RpcError> {
    let directory = ChainlistDirectory::from_client(client.clone());
    Provider::builder(Arc::new(ReqwestSender::from_client(client)))
        .config(config)
        .directory(Arc::new(directory))
        .build()
        .await
}
