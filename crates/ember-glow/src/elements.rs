use crate::path::Path;
use crate::tags::{Access, Disposition, MatrixType, ParameterType};
use crate::value::GlowValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub is_online: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub identifier: Option<String>,
    pub value: Option<GlowValue>,
    pub minimum: Option<GlowValue>,
    pub maximum: Option<GlowValue>,
    pub access: Option<Access>,
    pub param_type: Option<ParameterType>,
    /// Legacy enumeration: newline-separated option names, code = index.
    pub enumeration: Option<Vec<String>>,
    /// Modern enumeration: explicit name/code pairs.
    pub enum_map: Option<Vec<(String, i32)>>,
    pub is_online: Option<bool>,
    pub stream_identifier: Option<i32>,
    pub format: Option<String>,
    pub formula: Option<String>,
    pub factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub target: i32,
    pub sources: Vec<i32>,
    pub operation: Option<i32>,
    pub disposition: Option<Disposition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub matrix_type: Option<MatrixType>,
    pub target_count: Option<i32>,
    pub source_count: Option<i32>,
    pub targets: Option<Vec<i32>>,
    pub sources: Option<Vec<i32>>,
    pub connections: Option<Vec<Connection>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleItemDescription {
    pub name: Option<String>,
    pub item_type: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub arguments: Option<Vec<TupleItemDescription>>,
    pub result: Option<Vec<TupleItemDescription>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub id: i32,
    pub arguments: Vec<GlowValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub number: i32,
    pub invocation: Option<Invocation>,
    pub dir_field_mask: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    pub invocation_id: i32,
    pub success: Option<bool>,
    pub result: Option<Vec<GlowValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub stream_identifier: i32,
    pub value: GlowValue,
}

/// One decoded Glow element, with its resolved absolute path (computed from
/// a qualified path directly, or from a relative number plus the path of the
/// element it was nested under).
#[derive(Debug, Clone, PartialEq)]
pub enum GlowElement {
    Node {
        path: Path,
        contents: Node,
        children: Vec<GlowElement>,
    },
    Parameter {
        path: Path,
        contents: Parameter,
        children: Vec<GlowElement>,
    },
    Matrix {
        path: Path,
        contents: Matrix,
        children: Vec<GlowElement>,
    },
    Function {
        path: Path,
        contents: Function,
        children: Vec<GlowElement>,
    },
    Command {
        path: Path,
        command: Command,
    },
    InvocationResult(InvocationResult),
    StreamCollection(Vec<StreamEntry>),
}

impl GlowElement {
    pub fn path(&self) -> Option<&Path> {
        match self {
            GlowElement::Node { path, .. }
            | GlowElement::Parameter { path, .. }
            | GlowElement::Matrix { path, .. }
            | GlowElement::Function { path, .. }
            | GlowElement::Command { path, .. } => Some(path),
            GlowElement::InvocationResult(_) | GlowElement::StreamCollection(_) => None,
        }
    }
}
