//! Error types for hubchat-ai

use thiserror::Error;

/// Result type alias using hubchat-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the assistant service
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Assistant, thread or run does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Server-sent events error
    #[error("SSE error: {0}")]
    Sse(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from bad or missing credentials.
    ///
    /// These are configuration problems: the user has to fix the key or the
    /// assistant id before anything else can work.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Auth(_) | Error::InvalidApiKey => true,
            Error::Api { error_type, .. } => {
                let et = error_type.to_lowercase();
                et.contains("invalid_api_key") || et.contains("authentication")
            }
            _ => false,
        }
    }

    /// Build an error from a non-success HTTP status and its response body.
    ///
    /// The service wraps failures as `{"error": {"message", "type", "code"}}`;
    /// anything else is reported verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<crate::types::ApiErrorEnvelope>(body).ok();
        let (error_type, message) = match parsed {
            Some(envelope) => (
                envelope
                    .error
                    .error_type
                    .or(envelope.error.code)
                    .unwrap_or_else(|| format!("http_{}", status)),
                envelope.error.message,
            ),
            None => (format!("http_{}", status), body.trim().to_string()),
        };

        match status {
            401 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api {
                error_type,
                message,
            },
        }
    }
}
