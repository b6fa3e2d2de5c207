use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid path {0:?} in snapshot")]
    InvalidPath(String),
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
