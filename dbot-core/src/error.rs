use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    /// Transport signalled overload (Telegram flood wait). The only class the retry loop retries.
    #[error("Flood control exceeded (retry after {retry_after:?})")]
    Flood { retry_after: Option<Duration> },

    /// Edit rejected because the new text equals the current one.
    #[error("Message is not modified")]
    NotModified,

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Prefix of {prefix_len} chars leaves no room under the {limit} char message limit")]
    PrefixTooLong { prefix_len: usize, limit: usize },

    #[error("Reply session already closed")]
    SessionClosed,

    /// The whitelist store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DbotError {
    /// True for errors worth retrying after a pause.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbotError::Flood { .. })
    }
}

pub type Result<T> = std::result::Result<T, DbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_flood_is_transient() {
        assert!(DbotError::Flood { retry_after: None }.is_transient());
        assert!(DbotError::Flood {
            retry_after: Some(Duration::from_secs(5))
        }
        .is_transient());
        assert!(!DbotError::NotModified.is_transient());
        assert!(!DbotError::Bot("Bad Request: message is too long".into()).is_transient());
        assert!(!DbotError::SessionClosed.is_transient());
        assert!(!DbotError::Storage("database is locked".into()).is_transient());
    }
}
