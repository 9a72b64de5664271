//! Error types for hubchat-relay

use thiserror::Error;

/// Result type alias using hubchat-relay Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while relaying a conversation
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the assistant service layer
    #[error(transparent)]
    Ai(#[from] hubchat_ai::Error),

    /// A reply is still streaming; only one stream per session
    #[error("A reply is already streaming")]
    Busy,

    /// Stream completion reported with no stream open
    #[error("No reply is streaming")]
    NotStreaming,
}

impl Error {
    /// Check if this error comes from missing or rejected credentials
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Ai(e) => e.is_auth_error(),
            _ => false,
        }
    }
}
