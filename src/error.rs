//! Error types for the Indodax client and tool layer

use thiserror::Error;

/// Errors produced while configuring the client or calling the exchange
///
/// Exchange-level rejections (`{"success": 0, "error": ...}`) are not errors
/// here: a 2xx response is always returned to the caller as-is.
#[derive(Debug, Error)]
pub enum IndodaxError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl IndodaxError {
    /// True for failures that happened on the wire or at the HTTP layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Network(_) | Self::Decode(_)
        )
    }
}

pub type IndodaxResult<T> = Result<T, IndodaxError>;
