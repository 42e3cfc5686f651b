//! Policy engine — how endpoints are chosen and how failures are retried.
//!
//! ```text
//! Provider → [SelectionPolicy] → JsonRpcTransport → [RetrySender] → HttpSender
//! ```

pub mod retry;
pub mod selection;

pub use retry::{RetryConfig, RetryPolicy, RetrySender};
pub use selection::{RandomSelection, RoundRobinSelection, SelectionPolicy};
