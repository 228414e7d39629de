use thiserror::Error;

/// Delivery failure classification; it drives the retry policy.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transient failure (rate limit, server error, transport): worth
    /// retrying with backoff.
    #[error("Retryable delivery failure: {0}")]
    Retryable(String),

    /// Permanent failure (bad recipient, bad credentials): never retried.
    #[error("Fatal delivery failure: {0}")]
    Fatal(String),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Retryable(_))
    }
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
