use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The CMS root did not answer at run start
    #[error("Remote endpoint unreachable: {0}")]
    RemoteUnreachable(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
