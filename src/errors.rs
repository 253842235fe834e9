/// Errors returned when fetching remote STEP content.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Only HTTP(S) URLs are supported. For local files, read the file content and pass it directly. Received: {0}")]
    UnsupportedScheme(String),

    #[error("fetch is not available in this environment")]
    CapabilityUnavailable,

    #[error("Network error fetching STEP file (this may be a CORS issue - ensure the server allows cross-origin requests): {0}")]
    Network(String),

    #[error("HTTP {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// Reading the body failed after a successful status.
    #[error(transparent)]
    Body(NetError),
}

impl FetchError {
    /// Wraps a network-layer failure. Empty messages become `"unknown error"`.
    pub fn network(err: &impl std::fmt::Display) -> Self {
        let message = err.to_string();
        let message = message.trim();
        if message.is_empty() {
            FetchError::Network("unknown error".to_string())
        } else {
            FetchError::Network(message.to_string())
        }
    }

    /// HTTP status code, if the server answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure reported by an [`HttpClient`](crate::net::HttpClient) implementation.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}
