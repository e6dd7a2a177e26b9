use thiserror::Error;

/// Errors that end a stream session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The response has no readable log body
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// Connecting or reading failed
    #[error("{0}")]
    TransportFailure(String),

    /// The session was superseded or torn down on purpose
    #[error("stream canceled")]
    Canceled,
}

impl StreamError {
    /// Cancellation is expected and never shown to the user
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StreamError::Canceled)
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::TransportFailure(err.to_string())
    }
}
