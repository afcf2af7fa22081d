/// Failure reported by the transport collaborator.
///
/// Kept `Clone + PartialEq` so a failed fetch can be stored inside an
/// [`AsyncResource`](crate::AsyncResource) and compared structurally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Resource not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
