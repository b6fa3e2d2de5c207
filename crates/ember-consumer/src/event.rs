use ember_glow::{Access, GlowValue, MatrixType, ParameterType, Path};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub path: Path,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub is_online: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub path: Path,
    pub identifier: Option<String>,
    pub value: Option<GlowValue>,
    pub access: Option<Access>,
    pub param_type: Option<ParameterType>,
    pub is_online: Option<bool>,
    pub minimum: Option<GlowValue>,
    pub maximum: Option<GlowValue>,
    pub enum_options: Option<Vec<String>>,
    pub stream_identifier: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixInfo {
    pub path: Path,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub matrix_type: Option<MatrixType>,
    pub target_count: Option<i32>,
    pub source_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixConnectionInfo {
    pub path: Path,
    pub target: i32,
    pub source: i32,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamValue {
    pub stream_identifier: i32,
    pub value: GlowValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResultEvent {
    pub invocation_id: i32,
    pub path: Option<Path>,
    pub success: Option<bool>,
    pub result: Option<Vec<GlowValue>>,
}

/// Everything the consumer engine reports to its host, in the order it was
/// observed on this session (ordering across sessions is unspecified).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connected,
    Disconnected(String),
    Node(NodeInfo),
    Parameter(ParameterInfo),
    Matrix(MatrixInfo),
    MatrixTarget { path: Path, number: i32, label: Option<String> },
    MatrixSource { path: Path, number: i32, label: Option<String> },
    MatrixConnection(MatrixConnectionInfo),
    StreamValue(StreamValue),
    InvocationResult(InvocationResultEvent),
    DecodeError(String),
    TreeFetchProgress { completed: usize, total: usize },
    TreeFetchComplete,
}
