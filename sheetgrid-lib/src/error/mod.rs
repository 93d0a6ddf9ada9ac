//! Error types

mod source;

pub use source::*;

/// Errors surfaced by the sheetgrid data layer.
///
/// Cache consumers receive these wrapped in an `Arc` so every caller attached
/// to the same in-flight fetch observes the same failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching or decoding the upstream table failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The session context does not carry an authenticated capability.
    #[error("Session is not authenticated")]
    Unauthenticated,

    /// A data service answered with a failure response.
    #[error("Remote service error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code returned by the service.
        status: u16,
        /// The `error` field of the response body, or the raw body.
        message: String,
    },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure talking to a data service.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The local HTTP server failed to bind or accept.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl Error {
    /// Creates a new remote service error.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` if the upstream source or a data service could not be
    /// reached.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Source(source) => source.is_unreachable(),
            Self::Network(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the upstream payload did not have the expected shape.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Source(SourceError::Malformed { .. }))
    }
}
