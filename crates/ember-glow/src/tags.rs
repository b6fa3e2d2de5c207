//! Application-class tag numbers identifying each Glow element type, plus the
//! small fixed enumerations Glow carries as plain integers on the wire.

/// APPLICATION-class tag numbers, as assigned by the Glow GDTD.
pub mod glow_type {
    pub const PARAMETER: u32 = 1;
    pub const COMMAND: u32 = 2;
    pub const NODE: u32 = 3;
    pub const ELEMENT_COLLECTION: u32 = 4;
    pub const STREAM_ENTRY: u32 = 5;
    pub const STREAM_COLLECTION: u32 = 6;
    pub const STRING_INTEGER_PAIR: u32 = 7;
    pub const STRING_INTEGER_COLLECTION: u32 = 8;
    pub const QUALIFIED_PARAMETER: u32 = 9;
    pub const QUALIFIED_NODE: u32 = 10;
    pub const ROOT_ELEMENT_COLLECTION: u32 = 11;
    pub const MATRIX: u32 = 13;
    pub const TARGET: u32 = 14;
    pub const SOURCE: u32 = 15;
    pub const CONNECTION: u32 = 16;
    pub const QUALIFIED_MATRIX: u32 = 17;
    pub const LABEL: u32 = 18;
    pub const FUNCTION: u32 = 19;
    pub const QUALIFIED_FUNCTION: u32 = 20;
    pub const TUPLE_ITEM_DESCRIPTION: u32 = 21;
    pub const INVOCATION: u32 = 22;
    pub const INVOCATION_RESULT: u32 = 23;
}

/// `Command.number` values.
pub mod command_type {
    pub const SUBSCRIBE: i32 = 30;
    pub const UNSUBSCRIBE: i32 = 31;
    pub const GET_DIRECTORY: i32 = 32;
    pub const INVOKE: i32 = 33;
}

/// `Connection.operation` values.
pub mod matrix_operation {
    pub const ABSOLUTE: i32 = 0;
    pub const CONNECT: i32 = 1;
    pub const DISCONNECT: i32 = 2;
}

/// `Parameter.type` values (the tag of the contained value, not a BER universal tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Integer = 1,
    Real = 2,
    String = 3,
    Boolean = 4,
    Trigger = 5,
    Enum = 6,
    Octets = 7,
}

impl ParameterType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            1 => ParameterType::Integer,
            2 => ParameterType::Real,
            3 => ParameterType::String,
            4 => ParameterType::Boolean,
            5 => ParameterType::Trigger,
            6 => ParameterType::Enum,
            7 => ParameterType::Octets,
            _ => return None,
        })
    }
}

/// `Parameter.access` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl Access {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Access::None,
            1 => Access::Read,
            2 => Access::Write,
            3 => Access::ReadWrite,
            _ => return None,
        })
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// `Matrix.type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixType {
    #[default]
    OneToN = 0,
    OneToOne = 1,
    NToN = 2,
}

impl MatrixType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => MatrixType::OneToN,
            1 => MatrixType::OneToOne,
            2 => MatrixType::NToN,
            _ => return None,
        })
    }
}

/// `Connection.disposition` values. The engine only records and surfaces
/// these; semantics beyond `Tally` are device-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Tally = 0,
    Modified = 1,
    Pending = 2,
    Locked = 3,
}

impl Disposition {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Disposition::Tally,
            1 => Disposition::Modified,
            2 => Disposition::Pending,
            3 => Disposition::Locked,
            _ => return None,
        })
    }
}
