//! The `EndpointDirectory` trait — where pool endpoints come from.

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::DiscoveryError;
use crate::filter::{filter_candidates, CredentialFilter};

/// A source of candidate endpoints for a chain.
///
/// Implementations should return filtered endpoints; the provider applies
/// its own credential filter again before pooling them. An empty list is a
/// valid answer, not an error.
#[async_trait]
pub trait EndpointDirectory: Send + Sync + 'static {
    /// Fetch the usable endpoints for `chain_id`.
    async fn fetch(&self, chain_id: u64) -> Result<Vec<Endpoint>, DiscoveryError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// In-memory directory with a fixed URL list per call, filtered the same way
/// a remote directory would be.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    urls: Vec<String>,
    filter: CredentialFilter,
}

impl StaticDirectory {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            filter: CredentialFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: CredentialFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl EndpointDirectory for StaticDirectory {
    async fn fetch(&self, _chain_id: u64) -> Result<Vec<Endpoint>, DiscoveryError> {
        Ok(filter_candidates(&self.urls, &self.filter))
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_filters() {
        let dir = StaticDirectory::new([
            "https://rpc.example.com/?apikey=XYZ",
            "https://rpc.example.com",
        ]);
        let eps = dir.fetch(42161).await.unwrap();
        assert_eq!(eps, vec![Endpoint::parse("https://rpc.example.com").unwrap()]);
    }

    #[tokio::test]
    async fn static_directory_may_be_empty() {
        let dir = StaticDirectory::new(Vec::<String>::new());
        assert!(dir.fetch(1).await.unwrap().is_empty());
    }
}
