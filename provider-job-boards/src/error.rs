//! Error types for job board sources

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// Source answered with a non-200 status
    #[error("Source API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to parse source response: {0}")]
    ParseError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SourceError>;

impl From<SourceError> for BridgeError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::ApiError {
                status_code,
                message,
            } => BridgeError::Status {
                status: status_code,
                body: message,
            },
            SourceError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            SourceError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SourceError::ApiError {
            status_code: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Source API error (status 429): slow down"
        );
    }

    #[test]
    fn test_error_conversion() {
        let bridge: BridgeError = SourceError::ParseError("expected list".to_string()).into();
        assert!(matches!(bridge, BridgeError::OperationFailed(_)));
    }
}
