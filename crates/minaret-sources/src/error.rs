use thiserror::Error;

/// Errors from the external data collaborators.
///
/// All of these are non-fatal during a daily cycle: the controller logs them
/// and retries at the next poll, keeping whatever schedule is already armed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The geolocation provider could not produce usable coordinates.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// The prayer-times service request failed (HTTP status or transport).
    #[error("Fetch failed: {reason}")]
    FetchFailed {
        status: Option<u16>,
        reason: String,
    },

    /// The response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
