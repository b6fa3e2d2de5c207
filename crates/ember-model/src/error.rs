use ember_glow::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("path {path} is not exactly one element longer than its parent")]
    InvalidDepth { path: Path },
    #[error("path {path} already holds a {existing:?}, cannot become a {attempted:?}")]
    KindMismatch {
        path: Path,
        existing: &'static str,
        attempted: &'static str,
    },
    #[error("parameter {path} has type {existing:?}; cannot change to {attempted:?}")]
    ParameterTypeChanged {
        path: Path,
        existing: ember_glow::ParameterType,
        attempted: ember_glow::ParameterType,
    },
    #[error("enumeration name/code arrays at {path} have unequal length ({names} names, {codes} codes)")]
    EnumerationLengthMismatch { path: Path, names: usize, codes: usize },
    #[error("enum code {code} is used more than once at {path}")]
    DuplicateEnumCode { path: Path, code: i32 },
    #[error("streamIdentifier {stream_identifier} is already in use at {other_path}")]
    DuplicateStreamIdentifier { stream_identifier: i32, other_path: Path },
    #[error("no element at path {0}")]
    NotFound(Path),
    #[error("matrix {path} has no target {target}")]
    UnknownTarget { path: Path, target: i32 },
}

pub type ModelResult<T> = Result<T, ModelError>;
