//! Error taxonomy for the client.
//!
//! Extraction misses are deliberately absent from this enum: a heuristic that
//! finds nothing yields an empty collection or a `None` field, never an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Network failure, timeout, or a non-2xx status.
    #[error("Request to {url} failed: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// The site answered with a CAPTCHA or block page instead of data.
    #[error("Blocked by anti-bot challenge at {url} ({marker})")]
    AntiBotChallenge { url: String, marker: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },
}

impl ClientError {
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            url: url.into(),
            status: Some(status),
            message: format!("HTTP status {status}"),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_anti_bot(&self) -> bool {
        matches!(self, Self::AntiBotChallenge { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code() {
        let err = ClientError::status("https://www.rockauto.com/en/catalog/", 503);
        match err {
            ClientError::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn anti_bot_is_distinguishable() {
        let err = ClientError::AntiBotChallenge {
            url: "https://www.rockauto.com/".to_string(),
            marker: "g-recaptcha".to_string(),
        };
        assert!(err.is_anti_bot());
        assert!(!ClientError::validation("bad").is_anti_bot());
    }
}
