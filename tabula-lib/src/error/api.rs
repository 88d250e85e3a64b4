//! API error types

use std::time::Duration;

/// Errors that can occur while talking to a remote endpoint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the endpoint.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response body.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::parse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::http(status.as_u16(), e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}
