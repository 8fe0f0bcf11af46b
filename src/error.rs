use thiserror::Error;

/// A payload from the reviews API that does not match the expected shape.
///
/// The whole response is rejected; no partially decoded data escapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Missing field, wrong JSON type, or unparseable body.
    #[error("Malformed payload: {0}")]
    Schema(String),

    /// The payload parsed but a record breaks a field invariant.
    #[error("Invalid value for `{field}` in record {index}: {reason}")]
    Field {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// A single-object payload (location hygiene) breaks a field invariant.
    #[error("Invalid value for `{field}`: {reason}")]
    Value { field: &'static str, reason: String },

    #[error("Reply text is empty")]
    EmptyReply,
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Schema(e.to_string())
    }
}

/// Errors surfaced by the reviews API client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered 2xx but reported that it did not apply the change.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// The request was superseded before it completed.
    #[error("Request aborted")]
    Aborted,

    /// The task running the request stopped without reporting a result.
    #[error("Review fetch failed: {0}")]
    Task(String),
}

impl ClientError {
    /// Network failures and server-side errors can be retried as-is.
    /// A validation failure will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Aborted | ClientError::Task(_) => true,
            ClientError::Http { status, .. } => *status >= 500 || *status == 429,
            ClientError::Validation(_) | ClientError::Rejected(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}
