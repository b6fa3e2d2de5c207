//! Builds the outgoing Glow element trees for directory and mutation
//! replies, one level at a time and in the store's recorded order — never
//! random hash-map iteration order.

use ember_glow::{
    label_container_path, source_label_path, target_label_path, Function, GlowElement, GlowValue,
    Matrix, Node, Parameter, ParameterType, Path, LABEL_CONTAINER_SEGMENT, SOURCES_SEGMENT,
    TARGETS_SEGMENT,
};
use ember_model::{DeviceStore, StoredElement};

/// A single, non-nested wire element summarizing one stored element.
pub(crate) fn element_summary(path: &Path, stored: &StoredElement) -> GlowElement {
    match stored {
        StoredElement::Node(node) => GlowElement::Node {
            path: path.clone(),
            contents: Node {
                identifier: node.identifier.clone(),
                description: node.description.clone(),
                is_online: node.is_online,
            },
            children: Vec::new(),
        },
        StoredElement::Parameter(param) => GlowElement::Parameter {
            path: path.clone(),
            contents: Parameter {
                identifier: param.identifier.clone(),
                value: param.value.clone(),
                minimum: param.minimum.clone(),
                maximum: param.maximum.clone(),
                access: param.access,
                param_type: param.param_type,
                enumeration: param.enumeration.clone(),
                enum_map: param.enum_map.clone(),
                is_online: param.is_online,
                stream_identifier: param.stream_identifier,
                format: param.format.clone(),
                formula: param.formula.clone(),
                factor: param.factor,
            },
            children: Vec::new(),
        },
        StoredElement::Matrix(matrix) => GlowElement::Matrix {
            path: path.clone(),
            contents: Matrix {
                identifier: matrix.identifier.clone(),
                description: matrix.description.clone(),
                matrix_type: matrix.matrix_type,
                target_count: matrix.target_count,
                source_count: matrix.source_count,
                targets: if matrix.targets.is_empty() { None } else { Some(matrix.targets.clone()) },
                sources: if matrix.sources.is_empty() { None } else { Some(matrix.sources.clone()) },
                connections: Some(
                    matrix
                        .connections
                        .iter()
                        .map(|(target, sources)| ember_glow::Connection {
                            target: *target,
                            sources: sources.iter().map(|c| c.source).collect(),
                            operation: None,
                            disposition: sources.first().map(|c| c.disposition),
                        })
                        .collect(),
                ),
            },
            children: Vec::new(),
        },
        StoredElement::Function(function) => GlowElement::Function {
            path: path.clone(),
            contents: Function {
                identifier: function.identifier.clone(),
                description: function.description.clone(),
                arguments: function.arguments.clone(),
                result: function.result.clone(),
            },
            children: Vec::new(),
        },
    }
}

pub(crate) fn root_directory_response(store: &DeviceStore) -> Vec<GlowElement> {
    store.iter_roots().filter_map(|path| store.get(path).map(|el| element_summary(path, el))).collect()
}

/// The children of `path`, as individual qualified elements — or, if `path`
/// names the synthetic matrix-label sub-tree (or one of its two
/// sub-containers), the corresponding label listing.
pub(crate) fn node_directory_response(store: &DeviceStore, path: &Path) -> Vec<GlowElement> {
    if let Some(labels) = matrix_label_directory(store, path) {
        return labels;
    }
    store.children(path).iter().filter_map(|child| store.get(child).map(|el| element_summary(child, el))).collect()
}

fn matrix_label_directory(store: &DeviceStore, path: &Path) -> Option<Vec<GlowElement>> {
    let numbers = path.numbers();
    let last = *numbers.last()?;

    if last == LABEL_CONTAINER_SEGMENT {
        let matrix_path = path.parent()?;
        if !matches!(store.get(&matrix_path), Some(StoredElement::Matrix(_))) {
            return None;
        }
        let label_path = label_container_path(&matrix_path);
        return Some(vec![
            GlowElement::Node {
                path: label_path.child(TARGETS_SEGMENT),
                contents: Node { identifier: Some("targets".to_string()), description: None, is_online: None },
                children: Vec::new(),
            },
            GlowElement::Node {
                path: label_path.child(SOURCES_SEGMENT),
                contents: Node { identifier: Some("sources".to_string()), description: None, is_online: None },
                children: Vec::new(),
            },
        ]);
    }

    if numbers.len() < 2 {
        return None;
    }
    let container = numbers[numbers.len() - 2];
    if container != LABEL_CONTAINER_SEGMENT || (last != TARGETS_SEGMENT && last != SOURCES_SEGMENT) {
        return None;
    }
    let is_target = last == TARGETS_SEGMENT;
    let matrix_path = Path::from_numbers(numbers[..numbers.len() - 2].to_vec());
    let Some(StoredElement::Matrix(matrix)) = store.get(&matrix_path) else {
        return Some(Vec::new());
    };
    let labels = if is_target { &matrix.target_labels } else { &matrix.source_labels };
    Some(
        labels
            .iter()
            .map(|(number, label)| {
                let label_path =
                    if is_target { target_label_path(&matrix_path, *number) } else { source_label_path(&matrix_path, *number) };
                GlowElement::Parameter {
                    path: label_path,
                    contents: Parameter {
                        value: Some(GlowValue::String(label.clone())),
                        param_type: Some(ParameterType::String),
                        access: Some(ember_glow::Access::Read),
                        ..Default::default()
                    },
                    children: Vec::new(),
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_glow::Node;

    fn device_store() -> DeviceStore {
        let mut store = DeviceStore::new();
        store.put_node(&Path::root(1), &Node { identifier: Some("device".to_string()), ..Default::default() }).unwrap();
        store
            .put_node(&Path::parse("1.1").unwrap(), &Node { identifier: Some("sys".to_string()), ..Default::default() })
            .unwrap();
        store.set_children(&Path::root(1), vec![Path::parse("1.1").unwrap()]).unwrap();
        store.set_root_order(vec![Path::root(1)]);
        store
    }

    #[test]
    fn root_directory_lists_roots_in_recorded_order() {
        let store = device_store();
        let response = root_directory_response(&store);
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].path(), Some(&Path::root(1)));
    }

    #[test]
    fn node_directory_lists_children_in_recorded_order() {
        let store = device_store();
        let response = node_directory_response(&store, &Path::root(1));
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].path(), Some(&Path::parse("1.1").unwrap()));
    }

    #[test]
    fn matrix_label_directory_lists_targets_and_sources_containers() {
        let mut store = DeviceStore::new();
        store.put_matrix(&Path::root(5), &ember_glow::Matrix::default()).unwrap();
        let label_path = label_container_path(&Path::root(5));

        let response = node_directory_response(&store, &label_path);
        assert_eq!(response.len(), 2);
        assert_eq!(response[0].path(), Some(&label_path.child(TARGETS_SEGMENT)));
        assert_eq!(response[1].path(), Some(&label_path.child(SOURCES_SEGMENT)));
    }

    #[test]
    fn matrix_target_labels_are_returned_as_parameters() {
        let mut store = DeviceStore::new();
        store.put_matrix(&Path::root(5), &ember_glow::Matrix::default()).unwrap();
        if let Some(matrix) = store.matrix_mut(&Path::root(5)) {
            matrix.target_labels.insert(1, "Output A".to_string());
        }
        let targets_path = label_container_path(&Path::root(5)).child(TARGETS_SEGMENT);

        let response = node_directory_response(&store, &targets_path);
        assert_eq!(response.len(), 1);
        match &response[0] {
            GlowElement::Parameter { path, contents, .. } => {
                assert_eq!(path, &target_label_path(&Path::root(5), 1));
                assert_eq!(contents.value, Some(GlowValue::String("Output A".to_string())));
            }
            _ => panic!("expected parameter"),
        }
    }
}
