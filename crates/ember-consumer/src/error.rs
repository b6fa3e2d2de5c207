use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("framing error: {0}")]
    S101(#[from] ember_s101::S101Error),
    #[error("decode error: {0}")]
    Glow(#[from] ember_glow::GlowError),
    #[error("model error: {0}")]
    Model(#[from] ember_model::ModelError),
    #[error("not connected")]
    NotConnected,
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("unknown invocation id {0}")]
    UnknownInvocation(i32),
    #[error("engine task is gone")]
    EngineGone,
}

pub type ConsumerResult<T> = Result<T, ConsumerError>;
