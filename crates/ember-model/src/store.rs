use std::collections::HashMap;

use ember_glow::{GlowElement, Path};

use crate::element::{StoredElement, StoredFunction, StoredMatrix, StoredNode, StoredParameter};
use crate::error::{ModelError, ModelResult};

/// Path-keyed store of a device's Node/Parameter/Matrix/Function tree.
///
/// Owned exclusively by one engine task (consumer or provider); concurrent
/// access happens only through whatever snapshot/read view the host layer
/// builds on top, never through shared mutation of this type itself.
#[derive(Debug, Default)]
pub struct DeviceStore {
    elements: HashMap<Path, StoredElement>,
    root_order: Vec<Path>,
    stream_identifiers: HashMap<i32, Path>,
}

impl DeviceStore {
    pub fn new() -> Self {
        DeviceStore::default()
    }

    pub fn get(&self, path: &Path) -> Option<&StoredElement> {
        self.elements.get(path)
    }

    pub fn children(&self, path: &Path) -> &[Path] {
        match self.elements.get(path) {
            Some(StoredElement::Node(node)) => &node.children,
            Some(StoredElement::Matrix(matrix)) => &matrix.children,
            _ => &[],
        }
    }

    pub fn delete(&mut self, path: &Path) {
        self.elements.remove(path);
        self.root_order.retain(|p| p != path);
        self.stream_identifiers.retain(|_, p| p != path);
        if let Some(parent) = path.parent() {
            match self.elements.get_mut(&parent) {
                Some(StoredElement::Node(node)) => node.children.retain(|c| c != path),
                Some(StoredElement::Matrix(matrix)) => matrix.children.retain(|c| c != path),
                _ => {}
            }
        }
    }

    pub fn iter_roots(&self) -> impl Iterator<Item = &Path> {
        self.root_order.iter()
    }

    /// Overwrite the root order outright. Used when restoring a store from a
    /// snapshot, where root order is recorded explicitly rather than inferred
    /// from nesting.
    pub fn set_root_order(&mut self, roots: Vec<Path>) {
        self.root_order = roots;
    }

    /// Overwrite a node's or matrix's recorded children outright, in the
    /// given order.
    pub fn set_children(&mut self, path: &Path, children: Vec<Path>) -> ModelResult<()> {
        match self.elements.get_mut(path) {
            Some(StoredElement::Node(node)) => {
                node.children = children;
                Ok(())
            }
            Some(StoredElement::Matrix(matrix)) => {
                matrix.children = children;
                Ok(())
            }
            Some(other) => Err(ModelError::KindMismatch { path: path.clone(), existing: other.kind_name(), attempted: "Node or Matrix" }),
            None => Err(ModelError::NotFound(path.clone())),
        }
    }

    /// Ingest one decoded element (and, recursively, any nested children),
    /// applying every store invariant. A Node's own path is registered as a
    /// root when it has no parent in the tree yet.
    pub fn ingest(&mut self, element: &GlowElement) -> ModelResult<()> {
        self.ingest_with_parent(element, None)
    }

    fn ingest_with_parent(&mut self, element: &GlowElement, parent: Option<&Path>) -> ModelResult<()> {
        let Some(path) = element.path() else {
            // Command/InvocationResult/StreamCollection carry no element to store.
            return Ok(());
        };
        let path = path.clone();

        self.check_parent_kind(&path)?;

        match element {
            GlowElement::Node { contents, children, .. } => {
                self.put_node(&path, contents)?;
                self.register_under_parent(&path, parent);
                for child in children {
                    self.ingest_with_parent(child, Some(&path))?;
                }
            }
            GlowElement::Parameter { contents, children, .. } => {
                self.put_parameter(&path, contents)?;
                self.register_under_parent(&path, parent);
                for child in children {
                    self.ingest_with_parent(child, Some(&path))?;
                }
            }
            GlowElement::Matrix { contents, children, .. } => {
                self.put_matrix(&path, contents)?;
                self.register_under_parent(&path, parent);
                for child in children {
                    self.ingest_with_parent(child, Some(&path))?;
                }
            }
            GlowElement::Function { contents, children, .. } => {
                self.put_function(&path, contents)?;
                self.register_under_parent(&path, parent);
                for child in children {
                    self.ingest_with_parent(child, Some(&path))?;
                }
            }
            GlowElement::Command { .. }
            | GlowElement::InvocationResult(_)
            | GlowElement::StreamCollection(_) => {}
        }
        Ok(())
    }

    fn register_under_parent(&mut self, path: &Path, parent: Option<&Path>) {
        match parent.cloned().or_else(|| path.parent()) {
            Some(parent_path) => match self.elements.get_mut(&parent_path) {
                Some(StoredElement::Node(node)) => node.add_child(path.clone()),
                Some(StoredElement::Matrix(matrix)) => matrix.add_child(path.clone()),
                // Parent not a known Node/Matrix (or not yet observed) — treat as root.
                _ => {
                    if !self.root_order.contains(path) {
                        self.root_order.push(path.clone());
                    }
                }
            },
            None => {
                if !self.root_order.contains(path) {
                    self.root_order.push(path.clone());
                }
            }
        }
    }

    fn check_parent_kind(&self, path: &Path) -> ModelResult<()> {
        if path.depth() <= 1 {
            return Ok(());
        }
        let Some(parent) = path.parent() else { return Ok(()) };
        match self.elements.get(&parent) {
            Some(StoredElement::Node(_)) | Some(StoredElement::Matrix(_)) | None => Ok(()),
            Some(other) => Err(ModelError::KindMismatch {
                path: parent,
                existing: other.kind_name(),
                attempted: "Node or Matrix (a container of children)",
            }),
        }
    }

    pub fn put_node(&mut self, path: &Path, update: &ember_glow::Node) -> ModelResult<()> {
        match self.elements.entry(path.clone()).or_insert_with(|| StoredElement::Node(StoredNode::default())) {
            StoredElement::Node(node) => {
                node.merge(update);
                Ok(())
            }
            other => Err(ModelError::KindMismatch { path: path.clone(), existing: other.kind_name(), attempted: "Node" }),
        }
    }

    pub fn put_parameter(&mut self, path: &Path, update: &ember_glow::Parameter) -> ModelResult<()> {
        if let Some(new_type) = update.param_type {
            if let Some(StoredElement::Parameter(existing)) = self.elements.get(path) {
                if let Some(existing_type) = existing.param_type {
                    if existing_type != new_type {
                        return Err(ModelError::ParameterTypeChanged {
                            path: path.clone(),
                            existing: existing_type,
                            attempted: new_type,
                        });
                    }
                }
            }
        }
        if let Some(pairs) = &update.enum_map {
            let mut seen = std::collections::HashSet::new();
            for (_, code) in pairs {
                if !seen.insert(*code) {
                    return Err(ModelError::DuplicateEnumCode { path: path.clone(), code: *code });
                }
            }
        }
        if let Some(stream_id) = update.stream_identifier {
            if let Some(existing_path) = self.stream_identifiers.get(&stream_id) {
                if existing_path != path {
                    return Err(ModelError::DuplicateStreamIdentifier {
                        stream_identifier: stream_id,
                        other_path: existing_path.clone(),
                    });
                }
            }
            self.stream_identifiers.insert(stream_id, path.clone());
        }

        match self.elements.entry(path.clone()).or_insert_with(|| StoredElement::Parameter(StoredParameter::default())) {
            StoredElement::Parameter(param) => {
                param.merge(update);
                Ok(())
            }
            other => Err(ModelError::KindMismatch { path: path.clone(), existing: other.kind_name(), attempted: "Parameter" }),
        }
    }

    pub fn put_matrix(&mut self, path: &Path, update: &ember_glow::Matrix) -> ModelResult<()> {
        match self.elements.entry(path.clone()).or_insert_with(|| StoredElement::Matrix(StoredMatrix::default())) {
            StoredElement::Matrix(matrix) => {
                matrix.merge(update);
                Ok(())
            }
            other => Err(ModelError::KindMismatch { path: path.clone(), existing: other.kind_name(), attempted: "Matrix" }),
        }
    }

    pub fn put_function(&mut self, path: &Path, update: &ember_glow::Function) -> ModelResult<()> {
        match self.elements.entry(path.clone()).or_insert_with(|| StoredElement::Function(StoredFunction::default())) {
            StoredElement::Function(function) => {
                function.merge(update);
                Ok(())
            }
            other => Err(ModelError::KindMismatch { path: path.clone(), existing: other.kind_name(), attempted: "Function" }),
        }
    }

    pub fn matrix_mut(&mut self, path: &Path) -> Option<&mut StoredMatrix> {
        match self.elements.get_mut(path) {
            Some(StoredElement::Matrix(matrix)) => Some(matrix),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_glow::{Access, Node, Parameter, ParameterType};

    #[test]
    fn metadata_preserved_across_value_only_update() {
        let mut store = DeviceStore::new();
        let path = Path::parse("1.2").unwrap();
        store
            .put_parameter(
                &path,
                &Parameter {
                    identifier: Some("gain".to_string()),
                    access: Some(Access::ReadWrite),
                    param_type: Some(ParameterType::Real),
                    value: Some(ember_glow::GlowValue::Real(0.0)),
                    ..Default::default()
                },
            )
            .unwrap();

        store
            .put_parameter(&path, &Parameter { value: Some(ember_glow::GlowValue::Real(-6.0)), ..Default::default() })
            .unwrap();

        match store.get(&path).unwrap() {
            StoredElement::Parameter(param) => {
                assert_eq!(param.value, Some(ember_glow::GlowValue::Real(-6.0)));
                assert_eq!(param.identifier.as_deref(), Some("gain"));
                assert_eq!(param.access, Some(Access::ReadWrite));
                assert_eq!(param.param_type, Some(ParameterType::Real));
            }
            _ => panic!("expected parameter"),
        }
    }

    #[test]
    fn parameter_type_cannot_change_once_observed() {
        let mut store = DeviceStore::new();
        let path = Path::parse("1.2").unwrap();
        store
            .put_parameter(&path, &Parameter { param_type: Some(ParameterType::Real), ..Default::default() })
            .unwrap();
        let err = store
            .put_parameter(&path, &Parameter { param_type: Some(ParameterType::Integer), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ModelError::ParameterTypeChanged { .. }));
    }

    #[test]
    fn kind_cannot_change_at_a_path() {
        let mut store = DeviceStore::new();
        let path = Path::parse("1").unwrap();
        store.put_node(&path, &Node::default()).unwrap();
        let err = store.put_parameter(&path, &Parameter::default()).unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { .. }));
    }

    #[test]
    fn ingest_preserves_child_order_and_registers_roots() {
        let mut store = DeviceStore::new();
        let root = GlowElement::Node {
            path: Path::root(1),
            contents: Node { identifier: Some("device".to_string()), description: None, is_online: None },
            children: vec![
                GlowElement::Node {
                    path: Path::parse("1.1").unwrap(),
                    contents: Node { identifier: Some("sys".to_string()), description: None, is_online: None },
                    children: Vec::new(),
                },
                GlowElement::Parameter {
                    path: Path::parse("1.2").unwrap(),
                    contents: Parameter { identifier: Some("gain".to_string()), ..Default::default() },
                    children: Vec::new(),
                },
            ],
        };
        store.ingest(&root).unwrap();

        assert_eq!(store.iter_roots().collect::<Vec<_>>(), vec![&Path::root(1)]);
        assert_eq!(
            store.children(&Path::root(1)),
            &[Path::parse("1.1").unwrap(), Path::parse("1.2").unwrap()]
        );
    }

    #[test]
    fn duplicate_stream_identifier_is_rejected() {
        let mut store = DeviceStore::new();
        store
            .put_parameter(
                &Path::parse("1.1").unwrap(),
                &Parameter { stream_identifier: Some(7), ..Default::default() },
            )
            .unwrap();
        let err = store
            .put_parameter(
                &Path::parse("1.2").unwrap(),
                &Parameter { stream_identifier: Some(7), ..Default::default() },
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateStreamIdentifier { .. }));
    }
}
