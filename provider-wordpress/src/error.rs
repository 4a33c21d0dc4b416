//! Error types for the WordPress provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// WordPress provider errors
#[derive(Error, Debug)]
pub enum WordPressError {
    /// The REST API answered with a non-success status
    #[error("WordPress API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The requested post type route does not exist on this site
    #[error("No REST route for '{0}'")]
    RouteNotFound(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for WordPress operations
pub type Result<T> = std::result::Result<T, WordPressError>;

impl From<WordPressError> for BridgeError {
    fn from(error: WordPressError) -> Self {
        match error {
            WordPressError::ApiError {
                status_code,
                message,
            } => BridgeError::Status {
                status: status_code,
                body: message,
            },
            WordPressError::RouteNotFound(route) => BridgeError::RouteNotFound(route),
            WordPressError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            WordPressError::BridgeError(e) => e,
        }
    }
}
