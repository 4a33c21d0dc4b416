use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Outcome of a failed publish attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Listing has no title, apply URL or external id")]
    InvalidListing,

    /// Reconciliation found an equivalent post on the remote
    #[error("Listing already exists remotely as post {remote_id}")]
    AlreadyExists { remote_id: u64 },

    #[error("Remote rejected the post (status {status}): {body_excerpt}")]
    RemoteRejected { status: u16, body_excerpt: String },

    /// Transport kept failing after all retry attempts
    #[error("Remote unreachable: {0}")]
    Unreachable(String),

    /// The remote accepted the request but answered with something unreadable
    #[error("Unexpected remote response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, PublishError>;

impl From<BridgeError> for PublishError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Transport(msg) | BridgeError::NotAvailable(msg) => {
                PublishError::Unreachable(msg)
            }
            BridgeError::Io(e) => PublishError::Unreachable(e.to_string()),
            BridgeError::Status { status, body } => PublishError::RemoteRejected {
                status,
                body_excerpt: body,
            },
            BridgeError::RouteNotFound(route) => PublishError::RemoteRejected {
                status: 404,
                body_excerpt: format!("no route for '{}'", route),
            },
            BridgeError::OperationFailed(msg) => PublishError::InvalidResponse(msg),
        }
    }
}
