use thiserror::Error;

use minaret_sources::SourceError;

/// Errors that can occur within the scheduling subsystem.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collaborator failed while rebuilding the day's schedule.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The schedule configuration could not be interpreted.
    #[error("Invalid schedule option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
