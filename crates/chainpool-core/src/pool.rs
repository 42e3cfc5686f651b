//! Endpoint pool: discovered endpoints plus a fallback, with pluggable selection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::policy::{RandomSelection, SelectionPolicy};

/// Where selectable endpoints come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSource {
    /// Discovery produced endpoints. Built by [`EndpointSource::new`] this is
    /// never empty; an empty list built by hand selects the fallback.
    Discovered {
        endpoints: Vec<Endpoint>,
        fallback: Endpoint,
    },
    /// Discovery failed, returned nothing, or was never run.
    FallbackOnly(Endpoint),
}

impl EndpointSource {
    /// Build from a discovery result; an empty list collapses to `FallbackOnly`.
    pub fn new(discovered: Vec<Endpoint>, fallback: Endpoint) -> Self {
        if discovered.is_empty() {
            Self::FallbackOnly(fallback)
        } else {
            Self::Discovered {
                endpoints: discovered,
                fallback,
            }
        }
    }

    pub fn fallback(&self) -> &Endpoint {
        match self {
            Self::Discovered { fallback, .. } | Self::FallbackOnly(fallback) => fallback,
        }
    }

    /// Discovered endpoints; empty for `FallbackOnly`.
    pub fn discovered(&self) -> &[Endpoint] {
        match self {
            Self::Discovered { endpoints, .. } => endpoints,
            Self::FallbackOnly(_) => &[],
        }
    }
}

/// Read-only endpoint pool, safe to share across tasks.
///
/// Populated once at construction and never written afterwards.
pub struct EndpointPool {
    source: EndpointSource,
    policy: Arc<dyn SelectionPolicy>,
    selections: AtomicU64,
}

impl EndpointPool {
    pub fn new(source: EndpointSource, policy: Arc<dyn SelectionPolicy>) -> Self {
        Self {
            source,
            policy,
            selections: AtomicU64::new(0),
        }
    }

    /// Pool with uniform random selection.
    pub fn random(source: EndpointSource) -> Self {
        Self::new(source, Arc::new(RandomSelection::new()))
    }

    /// Pool that only ever serves `fallback`.
    pub fn fallback_only(fallback: Endpoint) -> Self {
        Self::random(EndpointSource::FallbackOnly(fallback))
    }

    /// Choose the endpoint for one request.
    pub fn select(&self) -> &Endpoint {
        self.selections.fetch_add(1, Ordering::Relaxed);
        match &self.source {
            EndpointSource::Discovered { endpoints, fallback } => {
                if endpoints.is_empty() {
                    return fallback;
                }
                let idx = self.policy.pick(endpoints) % endpoints.len();
                &endpoints[idx]
            }
            EndpointSource::FallbackOnly(fallback) => fallback,
        }
    }

    pub fn source(&self) -> &EndpointSource {
        &self.source
    }

    pub fn fallback(&self) -> &Endpoint {
        self.source.fallback()
    }

    /// Number of discovered endpoints (the fallback is not counted).
    pub fn len(&self) -> usize {
        self.source.discovered().len()
    }

    /// Returns `true` if only the fallback is available.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `select` calls so far.
    pub fn selections(&self) -> u64 {
        self.selections.load(Ordering::Relaxed)
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }
}

impl std::fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointPool")
            .field("source", &self.source)
            .field("policy", &self.policy.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RoundRobinSelection;

    fn ep(url: &str) -> Endpoint {
        Endpoint::parse(url).unwrap()
    }

    fn discovered() -> Vec<Endpoint> {
        vec![
            ep("https://a.example.com"),
            ep("https://b.example.com"),
            ep("https://c.example.com"),
        ]
    }

    #[test]
    fn selected_is_always_discovered() {
        let eps = discovered();
        let pool = EndpointPool::random(EndpointSource::new(eps.clone(), ep("http://localhost:8545")));
        for _ in 0..1_000 {
            assert!(eps.contains(pool.select()));
        }
        assert_eq!(pool.selections(), 1_000);
    }

    #[test]
    fn empty_discovery_always_uses_fallback() {
        let fallback = ep("http://localhost:8545");
        let pool = EndpointPool::random(EndpointSource::new(vec![], fallback.clone()));
        assert!(pool.is_empty());
        assert!(matches!(pool.source(), EndpointSource::FallbackOnly(_)));
        for _ in 0..100 {
            assert_eq!(pool.select(), &fallback);
        }
    }

    #[test]
    fn hand_built_empty_discovered_uses_fallback() {
        let fallback = ep("http://localhost:8545");
        let source = EndpointSource::Discovered {
            endpoints: vec![],
            fallback: fallback.clone(),
        };
        let random = EndpointPool::random(source.clone());
        let round_robin = EndpointPool::new(source, Arc::new(RoundRobinSelection::new()));
        for _ in 0..10 {
            assert_eq!(random.select(), &fallback);
            assert_eq!(round_robin.select(), &fallback);
        }
    }

    #[test]
    fn fallback_kept_when_discovered() {
        let fallback = ep("http://localhost:8545");
        let pool = EndpointPool::random(EndpointSource::new(discovered(), fallback.clone()));
        assert_eq!(pool.fallback(), &fallback);
        assert_eq!(pool.len(), 3);
        for _ in 0..100 {
            assert_ne!(pool.select(), &fallback);
        }
    }

    #[test]
    fn seeded_pools_agree() {
        let source = EndpointSource::new(discovered(), ep("http://localhost:8545"));
        let a = EndpointPool::new(source.clone(), Arc::new(RandomSelection::seeded(9)));
        let b = EndpointPool::new(source, Arc::new(RandomSelection::seeded(9)));
        for _ in 0..50 {
            assert_eq!(a.select(), b.select());
        }
    }

    #[test]
    fn policy_is_pluggable() {
        let pool = EndpointPool::new(
            EndpointSource::new(discovered(), ep("http://localhost:8545")),
            Arc::new(RoundRobinSelection::new()),
        );
        assert_eq!(pool.policy_name(), "round-robin");
        assert_eq!(pool.select().as_str(), "https://a.example.com");
        assert_eq!(pool.select().as_str(), "https://b.example.com");
        assert_eq!(pool.select().as_str(), "https://c.example.com");
        assert_eq!(pool.select().as_str(), "https://a.example.com");
    }

    #[test]
    fn concurrent_selection() {
        let eps = discovered();
        let pool = Arc::new(EndpointPool::random(EndpointSource::new(
            eps.clone(),
            ep("http://localhost:8545"),
        )));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let eps = eps.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        assert!(eps.contains(pool.select()));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(pool.selections(), 4_000);
    }
}
