//! Error types for the feed client

use reqwest::StatusCode;

/// Result type for feed client operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur while talking to the SecMon backend
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Request could not be sent or the response body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { status: StatusCode, url: String },

    /// Requested resource does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Payload was not the expected JSON shape.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// WebSocket handshake or transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// Whether the failure is likely to go away on its own (network drop, 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Http(_) | FeedError::WebSocket(_) => true,
            FeedError::Status { status, .. } => status.is_server_error(),
            FeedError::NotFound(_)
            | FeedError::Decode(_)
            | FeedError::InvalidUrl(_)
            | FeedError::Config(_) => false,
        }
    }
}
