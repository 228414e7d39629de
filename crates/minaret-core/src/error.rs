use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinaretError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Unknown prayer name: {0}")]
    UnknownPrayer(String),
}

pub type Result<T> = std::result::Result<T, MinaretError>;
