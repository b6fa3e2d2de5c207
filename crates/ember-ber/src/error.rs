use thiserror::Error;

/// Decode/encode failures from the BER layer.
///
/// `Incomplete` is not a real failure — it tells [`crate::reader::StreamingReader`]
/// that the buffered bytes do not yet contain a full TLV and more input is needed.
/// Callers that only use the one-shot [`crate::decode_one`] should treat it the
/// same as any other error.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BerError {
    #[error("buffered bytes do not yet contain a complete value")]
    Incomplete,
    #[error("malformed tag at offset {offset}")]
    MalformedTag { offset: usize },
    #[error("malformed length at offset {offset}")]
    MalformedLength { offset: usize },
    #[error("length {0} exceeds the maximum supported BER value size")]
    LengthTooLarge(usize),
    #[error("unexpected tag: expected {expected}, got {actual}")]
    UnexpectedTag { expected: String, actual: String },
    #[error("trailing bytes after a definite-length value")]
    TrailingBytes,
    #[error("invalid boolean contents (expected exactly 1 octet)")]
    InvalidBoolean,
    #[error("invalid integer contents (empty)")]
    InvalidInteger,
    #[error("integer value does not fit in i64")]
    IntegerOverflow,
    #[error("invalid REAL contents")]
    InvalidReal,
    #[error("invalid UTF-8 string contents: {0}")]
    InvalidUtf8(String),
    #[error("invalid relative OID contents")]
    InvalidObjectIdentifier,
    #[error("a primitive value cannot have a constructed encoding here")]
    UnexpectedConstructed,
    #[error("a constructed value cannot have a primitive encoding here")]
    UnexpectedPrimitive,
}

pub type BerResult<T> = Result<T, BerError>;
