use async_trait::async_trait;

use crate::error::Result;

/// Outbound delivery seam.
///
/// Implementations must be `Send + Sync` so a single adapter can be shared
/// by the dispatch worker and any best-effort senders. `send` takes `&self`
/// so a connected adapter can deliver concurrently without a mutable borrow.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Stable lowercase identifier for this channel (used in logs).
    fn name(&self) -> &str;

    /// Deliver one message body to `recipient` (a platform-native ID).
    ///
    /// Errors must be classified: [`DeliveryError::Retryable`] for transient
    /// conditions, [`DeliveryError::Fatal`] for anything a retry cannot fix.
    async fn send(&self, recipient: &str, body: &str) -> Result<()>;
}
