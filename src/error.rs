use thiserror::Error;

/// Everything that can go wrong in the scout.
///
/// Only `Config` is fatal; every other variant degrades to "skip this item"
/// or "try again next tick".
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Missing or malformed environment configuration.
    #[error("config error: {0}")]
    Config(String),

    /// User-supplied filter value that could not be parsed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Divar answered with a non-success status.
    #[error("marketplace error: {0}")]
    Marketplace(String),

    /// Transport failure or timeout talking to Divar.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram refused or failed to deliver a message.
    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<teloxide::RequestError> for ScoutError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Delivery(e.to_string())
    }
}
