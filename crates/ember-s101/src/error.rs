use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum S101Error {
    #[error("frame CRC mismatch: expected {expected:#06x}, got {actual:#06x}")]
    CrcMismatch { expected: u16, actual: u16 },
    #[error("frame truncated before a complete CRC trailer arrived")]
    TruncatedFrame,
    #[error("unsupported message type {0:#04x}")]
    UnsupportedMessageType(u8),
    #[error("unsupported command {0:#04x}")]
    UnsupportedCommand(u8),
    #[error("EmBER payload header is shorter than required")]
    TruncatedHeader,
    #[error("app bytes count {declared} does not match available bytes {available}")]
    AppBytesMismatch { declared: usize, available: usize },
}

pub type S101Result<T> = Result<T, S101Error>;
