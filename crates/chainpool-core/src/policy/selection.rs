//! Endpoint selection strategies.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::endpoint::Endpoint;

/// Chooses one endpoint out of a non-empty candidate slice.
///
/// Called concurrently from every in-flight request, so implementations
/// must be internally synchronized.
pub trait SelectionPolicy: Send + Sync + 'static {
    /// Index of the chosen candidate. `candidates` is never empty.
    fn pick(&self, candidates: &[Endpoint]) -> usize;

    /// Strategy name for logs.
    fn name(&self) -> &str;
}

/// Uniform random choice, independent per call.
///
/// Uses the thread-local RNG unless one is injected, in which case calls
/// share it behind a mutex and the sequence is reproducible.
pub struct RandomSelection {
    rng: Option<Mutex<Box<dyn RngCore + Send>>>,
}

impl RandomSelection {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Deterministic selection for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Some(Mutex::new(Box::new(rng))),
        }
    }
}

impl Default for RandomSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSelection")
            .field("injected_rng", &self.rng.is_some())
            .finish()
    }
}

impl SelectionPolicy for RandomSelection {
    fn pick(&self, candidates: &[Endpoint]) -> usize {
        let len = candidates.len();
        match &self.rng {
            None => rand::thread_rng().gen_range(0..len),
            Some(rng) => {
                // A poisoned lock still holds a usable RNG.
                let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
                rng.gen_range(0..len)
            }
        }
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Cycles through candidates in order, starting from the first.
#[derive(Debug, Default)]
pub struct RoundRobinSelection {
    cursor: AtomicUsize,
}

impl RoundRobinSelection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for RoundRobinSelection {
    fn pick(&self, candidates: &[Endpoint]) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % candidates.len()
    }

    fn name(&self) -> &str {
        "round-robin"
    }
}
