use async_trait::async_trait;

use crate::{messaging::types::SendOptions, Result};

/// Outbound port the alert bot dispatches through.
///
/// Implementations report any delivery problem (network, auth, rate limit,
/// unknown chat) as an `Err`; what happens to it is the caller's policy.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(&self, destination: &str, body: &str, options: SendOptions) -> Result<()>;
}
