//! Bounded retry with exponential backoff for transient transport failures.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpSender};

/// Configuration for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total tries per request, including the first. `0` behaves as `1`.
    pub max_attempts: u32,
    /// Delay before the first retry. Zero disables sleeping entirely.
    pub initial_backoff: Duration,
    /// Maximum backoff delay (caps exponential growth).
    pub max_backoff: Duration,
    /// Multiplier applied to backoff on each retry.
    pub multiplier: f64,
    /// Methods sent exactly once, e.g. transaction submission.
    pub non_retryable_methods: HashSet<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            non_retryable_methods: HashSet::new(),
        }
    }
}

impl RetryConfig {
    /// Fixed attempt count with no delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_non_retryable_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_retryable_methods
            .extend(methods.into_iter().map(Into::into));
        self
    }
}

/// Stateless retry policy — computes the next delay given the attempt number.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Delay to wait after the `attempt`-th failed try (1-based; 0 is
    /// treated as 1). Returns `None` once no attempts remain.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts() {
            return None;
        }
        let base_ms = self.config.initial_backoff.as_millis() as f64
            * self.config.multiplier.powi(attempt.saturating_sub(1) as i32);
        let cap_ms = self.config.max_backoff.as_millis() as f64;
        Some(Duration::from_millis(base_ms.min(cap_ms) as u64))
    }

    /// Returns `true` if `method` may be sent more than once.
    pub fn allows_method(&self, method: &str) -> bool {
        !self.config.non_retryable_methods.contains(method)
    }
}

/// `HttpSender` middleware that resends transient failures verbatim.
///
/// Only [`TransportError::is_transient`] errors are retried; decode and
/// node-side errors happen above this layer and are never seen here.
pub struct RetrySender {
    inner: Arc<dyn HttpSender>,
    policy: RetryPolicy,
}

impl RetrySender {
    pub fn new(inner: Arc<dyn HttpSender>, config: RetryConfig) -> Self {
        Self {
            inner,
            policy: RetryPolicy::new(config),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl HttpSender for RetrySender {
    async fn post(&self, req: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let resendable = self.policy.allows_method(&req.rpc_method);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.inner.post(req).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && resendable => {
                    match self.policy.next_delay(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                url = %req.url,
                                method = %req.rpc_method,
                                "retrying request"
                            );
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        None => {
                            tracing::error!(
                                attempt,
                                error = %e,
                                url = %req.url,
                                method = %req.rpc_method,
                                "max attempts exceeded"
                            );
                            return Err(e);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
