/*
[INPUT]:  Error sources (HTTP, API status, serialization, URL)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ApiErrorBody;

/// Main error type for the Mega-Web adapter
#[derive(Error, Debug)]
pub enum MegaWebError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MegaWebError {
    /// Check if the error is likely transient
    pub fn is_retryable(&self) -> bool {
        match self {
            MegaWebError::Http(err) => err.is_timeout() || err.is_connect(),
            MegaWebError::Api { code, .. } => *code >= 500,
            MegaWebError::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// Check if the server rejected the request itself (4xx)
    pub fn is_rejected(&self) -> bool {
        matches!(self, MegaWebError::Api { code, .. } if (400..500).contains(code))
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        MegaWebError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body.
    ///
    /// Bodies shaped like the server's `{"message", "error"}` answers are
    /// flattened; anything else is kept as text.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => {
                let detail = parsed.detail();
                if detail.is_empty() {
                    parsed.message
                } else {
                    format!("{}: {}", parsed.message, detail)
                }
            }
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("empty response body")
                .to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::api_error(status, message)
    }
}

/// Result type alias for Mega-Web operations
pub type Result<T> = std::result::Result<T, MegaWebError>;
