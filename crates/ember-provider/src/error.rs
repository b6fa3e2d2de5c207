use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("framing error: {0}")]
    S101(#[from] ember_s101::S101Error),
    #[error("decode error: {0}")]
    Glow(#[from] ember_glow::GlowError),
    #[error("model error: {0}")]
    Model(#[from] ember_model::ModelError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] ember_snapshot::SnapshotError),
    #[error("listener is not running")]
    NotListening,
}

pub type ProviderResult<T> = Result<T, ProviderError>;
