use ember_ber::BerError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlowError {
    #[error("BER decode failure: {0}")]
    Ber(#[from] BerError),
    #[error("unrecognized application tag number {0}")]
    UnrecognizedTag(u32),
    #[error("{element} is missing required field {field}")]
    MissingField { element: &'static str, field: &'static str },
    #[error("{element}.{field} has an out-of-range enumeration value {value}")]
    InvalidEnumValue {
        element: &'static str,
        field: &'static str,
        value: i32,
    },
    #[error("empty path in a qualified element")]
    EmptyPath,
}

pub type GlowResult<T> = Result<T, GlowError>;
