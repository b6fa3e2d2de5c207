use ember_glow::{Access, Disposition, GlowValue, MatrixType, ParameterType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredNode {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub is_online: Option<bool>,
    pub children: Vec<ember_glow::Path>,
}

impl StoredNode {
    /// Apply an update that carries only changed fields; children are
    /// appended (deduplicated) rather than replaced, preserving discovery order.
    pub fn merge(&mut self, update: &ember_glow::Node) {
        if update.identifier.is_some() {
            self.identifier = update.identifier.clone();
        }
        if update.description.is_some() {
            self.description = update.description.clone();
        }
        if update.is_online.is_some() {
            self.is_online = update.is_online;
        }
    }

    pub fn add_child(&mut self, path: ember_glow::Path) {
        if !self.children.contains(&path) {
            self.children.push(path);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredParameter {
    pub identifier: Option<String>,
    pub value: Option<GlowValue>,
    pub minimum: Option<GlowValue>,
    pub maximum: Option<GlowValue>,
    pub access: Option<Access>,
    pub param_type: Option<ParameterType>,
    pub enumeration: Option<Vec<String>>,
    pub enum_map: Option<Vec<(String, i32)>>,
    pub is_online: Option<bool>,
    pub stream_identifier: Option<i32>,
    pub format: Option<String>,
    pub formula: Option<String>,
    pub factor: Option<f64>,
}

impl StoredParameter {
    pub fn is_editable(&self) -> bool {
        self.is_online.unwrap_or(false) && self.access.map(Access::is_writable).unwrap_or(false)
    }

    /// Merge an update, preserving metadata fields the update omits. The
    /// caller is responsible for the type-immutability invariant — this only
    /// applies the merge once that check has passed.
    pub fn merge(&mut self, update: &ember_glow::Parameter) {
        if update.identifier.is_some() {
            self.identifier = update.identifier.clone();
        }
        if update.value.is_some() {
            self.value = update.value.clone();
        }
        if update.minimum.is_some() {
            self.minimum = update.minimum.clone();
        }
        if update.maximum.is_some() {
            self.maximum = update.maximum.clone();
        }
        if update.access.is_some() {
            self.access = update.access;
        }
        if update.param_type.is_some() {
            self.param_type = update.param_type;
        }
        if update.enumeration.is_some() {
            self.enumeration = update.enumeration.clone();
        }
        if update.enum_map.is_some() {
            self.enum_map = update.enum_map.clone();
        }
        if update.is_online.is_some() {
            self.is_online = update.is_online;
        }
        if update.stream_identifier.is_some() {
            self.stream_identifier = update.stream_identifier;
        }
        if update.format.is_some() {
            self.format = update.format.clone();
        }
        if update.formula.is_some() {
            self.formula = update.formula.clone();
        }
        if update.factor.is_some() {
            self.factor = update.factor;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixConnection {
    pub source: i32,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredMatrix {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub matrix_type: Option<MatrixType>,
    pub target_count: Option<i32>,
    pub source_count: Option<i32>,
    pub targets: Vec<i32>,
    pub sources: Vec<i32>,
    pub target_labels: std::collections::BTreeMap<i32, String>,
    pub source_labels: std::collections::BTreeMap<i32, String>,
    /// target -> connected sources, in connection order.
    pub connections: std::collections::BTreeMap<i32, Vec<MatrixConnection>>,
    /// Child elements, e.g. the synthetic label sub-tree.
    pub children: Vec<ember_glow::Path>,
}

impl StoredMatrix {
    pub fn add_child(&mut self, path: ember_glow::Path) {
        if !self.children.contains(&path) {
            self.children.push(path);
        }
    }

    pub fn merge(&mut self, update: &ember_glow::Matrix) {
        if update.identifier.is_some() {
            self.identifier = update.identifier.clone();
        }
        if update.description.is_some() {
            self.description = update.description.clone();
        }
        if update.matrix_type.is_some() {
            self.matrix_type = update.matrix_type;
        }
        if update.target_count.is_some() {
            self.target_count = update.target_count;
        }
        if update.source_count.is_some() {
            self.source_count = update.source_count;
        }
        if let Some(targets) = &update.targets {
            self.targets = targets.clone();
        }
        if let Some(sources) = &update.sources {
            self.sources = sources.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredFunction {
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub arguments: Option<Vec<ember_glow::TupleItemDescription>>,
    pub result: Option<Vec<ember_glow::TupleItemDescription>>,
}

impl StoredFunction {
    pub fn merge(&mut self, update: &ember_glow::Function) {
        if update.identifier.is_some() {
            self.identifier = update.identifier.clone();
        }
        if update.description.is_some() {
            self.description = update.description.clone();
        }
        if update.arguments.is_some() {
            self.arguments = update.arguments.clone();
        }
        if update.result.is_some() {
            self.result = update.result.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoredElement {
    Node(StoredNode),
    Parameter(StoredParameter),
    Matrix(StoredMatrix),
    Function(StoredFunction),
}

impl StoredElement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            StoredElement::Node(_) => "Node",
            StoredElement::Parameter(_) => "Parameter",
            StoredElement::Matrix(_) => "Matrix",
            StoredElement::Function(_) => "Function",
        }
    }
}
