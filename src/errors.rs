use std::error::Error as StdError;
use thiserror::Error;

/// Result type alias for ntopng REST operations
pub type Result<T> = std::result::Result<T, NtopngError>;

/// Errors that can occur when talking to the ntopng REST API
#[derive(Debug, Error)]
pub enum NtopngError {
    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Failed to read the response body
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// ntopng returned an error response
    #[error("ntopng API error: HTTP {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from ntopng
        message: String,
    },

    /// A query failed while running the self test
    ///
    /// The failing operation's error is preserved as the source.
    #[error("Self test failed: invalid interface id, host, or parameters")]
    SelfTest(#[source] Box<NtopngError>),
}

impl NtopngError {
    /// Check if the error is retryable
    ///
    /// Returns `true` for:
    /// - Network/connection errors
    /// - Timeout errors
    /// - Server errors (5xx status codes)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(source) => {
                if let Some(reqwest_err) = StdError::source(source) {
                    if let Some(err) = reqwest_err.downcast_ref::<reqwest::Error>() {
                        return err.is_connect() || err.is_timeout();
                    }
                }
                false
            }
            Self::Api { status, .. } => *status >= 500,
            Self::SelfTest(source) => source.is_retryable(),
            _ => false,
        }
    }
}
