//! Error types for the places client.

use thiserror::Error;

/// Result type for places client operations.
pub type Result<T> = std::result::Result<T, PlacesError>;

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Places client errors.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Non-2xx response from the upstream API
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Request did not complete within the per-request timeout
    #[error("timeout requesting {url}")]
    Timeout { url: String },

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Body was not valid JSON
    #[error("decode error: {0}")]
    Decode(String),

    /// Client could not be constructed (bad settings)
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlacesError {
    /// Whether the failure should be retried with backoff.
    ///
    /// Only HTTP errors outside [`RETRYABLE_STATUSES`] are final. Timeouts and
    /// every unexpected failure get another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            PlacesError::Http { status, .. } => RETRYABLE_STATUSES.contains(status),
            PlacesError::Config(_) => false,
            PlacesError::Timeout { .. } | PlacesError::Network(_) | PlacesError::Decode(_) => true,
        }
    }

    pub fn http(status: u16, url: impl Into<String>) -> Self {
        PlacesError::Http {
            status,
            url: url.into(),
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return PlacesError::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return PlacesError::http(status.as_u16(), url);
        }
        if err.is_decode() {
            return PlacesError::Decode(err.to_string());
        }
        PlacesError::Network(err.to_string())
    }
}
