use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream hiccup worth another attempt on a later poll cycle.
    #[error("Transient upstream failure: {0}")]
    TransientUpstream(String),

    #[error("Upstream failure: {0}")]
    TerminalUpstream(String),

    #[error("Item already processed: {0}")]
    DuplicateItem(String),

    /// The feed refused the reply (archived thread, locked post, ...).
    #[error("Reply rejected: {0}")]
    PostRejected(String),

    #[error("Bad link: {0}")]
    BadLink(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl BotError {
    /// Only a transient upstream failure leaves the item unmarked.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BotError::TransientUpstream(_))
    }
}

impl From<crate::config::ConfigError> for BotError {
    fn from(e: crate::config::ConfigError) -> Self {
        BotError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(BotError::TransientUpstream("504".into()).is_retryable());
        assert!(!BotError::TerminalUpstream("500".into()).is_retryable());
        assert!(!BotError::PostRejected("TOO_OLD".into()).is_retryable());
        assert!(!BotError::BadLink("x".into()).is_retryable());
    }
}
