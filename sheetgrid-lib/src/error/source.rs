//! Upstream source error types

/// Errors that can occur while fetching or decoding the upstream table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure reaching the upstream source.
    #[error("Source unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The upstream source answered with a non-success status.
    #[error("Source returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The payload does not match the expected table shape.
    ///
    /// This includes envelope stripping failures, so a change in the upstream
    /// prefix or suffix length surfaces here.
    #[error("Malformed source payload: {message}")]
    Malformed {
        /// Description of what did not parse.
        message: String,
        /// Raw payload, if available.
        body: Option<String>,
    },
}

impl SourceError {
    /// Creates a new malformed payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new malformed payload error with the raw payload attached.
    pub fn malformed_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns `true` if this is a transport or status failure.
    ///
    /// Malformed payloads are reported, never retried.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Status { .. })
    }
}
