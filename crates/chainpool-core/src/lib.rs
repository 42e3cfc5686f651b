//! chainpool-core — endpoint pool and request dispatch for ChainPool.
//!
//! # Overview
//!
//! ChainPool keeps a JSON-RPC client available when individual public
//! endpoints fail, rate-limit, or disappear, by spreading calls over a pool of
//! equivalent endpoints discovered for a chain. The core crate defines:
//!
//! - [`Provider`] — the public facade: `call(method, params)`
//! - [`EndpointPool`] / [`EndpointSource`] — discovered endpoints plus fallback
//! - [`EndpointDirectory`] — where endpoints come from
//! - [`CredentialFilter`] — denylist for key-gated URLs
//! - [`HttpSender`] — the raw "POST bytes, get bytes" seam
//! - [`JsonRpcTransport`] — JSON-RPC encoding and decoding around a sender
//! - [`policy`] module — selection strategies and retry middleware
//! - [`error`] module — discovery, transport, and decode errors

pub mod config;
pub mod directory;
pub mod endpoint;
pub mod error;
pub mod filter;
pub mod policy;
pub mod pool;
pub mod provider;
pub mod request;
pub mod transport;

pub use config::{ProviderConfig, RequestConfig};
pub use directory::{EndpointDirectory, StaticDirectory};
pub use endpoint::Endpoint;
pub use error::{DecodeError, DiscoveryError, RpcError, TransportError};
pub use filter::{filter_candidates, CredentialFilter};
pub use policy::{RandomSelection, RetryConfig, RoundRobinSelection, SelectionPolicy};
pub use pool::{EndpointPool, EndpointSource};
pub use provider::{Provider, ProviderBuilder};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use transport::{Headers, HttpRequest, HttpSender, JsonRpcTransport};
