//! Conversion between a live `DeviceStore` and the JSON snapshot shape, and
//! the JSON (de)serialization itself.

use std::collections::BTreeMap;

use ember_glow::{GlowValue, Path};
use ember_model::{DeviceStore, StoredElement};

use crate::error::{SnapshotError, SnapshotResult};
use crate::model::{
    ConnectionJson, FunctionJson, JsonValue, MatrixJson, NodeJson, ParameterJson, Snapshot,
    Statistics, CURRENT_FORMAT_VERSION,
};

pub fn save_json(snapshot: &Snapshot) -> SnapshotResult<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn load_json(text: &str) -> SnapshotResult<Snapshot> {
    Ok(serde_json::from_str(text)?)
}

/// Walk `store`'s whole tree (every root and, recursively, every child under
/// a Node or Matrix) and serialize it to a snapshot. `capture_time` is
/// supplied by the caller so this function stays free of wall-clock effects.
pub fn from_store(
    store: &DeviceStore,
    device_name: &str,
    capture_time: &str,
    host_address: &str,
    port: u16,
) -> Snapshot {
    let mut nodes = Vec::new();
    let mut parameters = Vec::new();
    let mut matrices = Vec::new();
    let mut functions = Vec::new();
    let root_paths: Vec<Path> = store.iter_roots().cloned().collect();

    let mut stack: Vec<Path> = root_paths.clone();
    let mut visit_order = Vec::new();
    while let Some(path) = stack.pop() {
        visit_order.push(path.clone());
        let mut children: Vec<Path> = store.children(&path).to_vec();
        children.reverse();
        stack.extend(children);
    }

    for path in visit_order {
        let Some(element) = store.get(&path) else { continue };
        match element {
            StoredElement::Node(node) => nodes.push(NodeJson {
                path: path.to_string(),
                identifier: node.identifier.clone(),
                description: node.description.clone(),
                is_online: node.is_online,
                children: node.children.iter().map(Path::to_string).collect(),
            }),
            StoredElement::Parameter(param) => parameters.push(ParameterJson {
                path: path.to_string(),
                identifier: param.identifier.clone(),
                value: param.value.as_ref().and_then(glow_value_to_json),
                param_type: param.param_type.map(|t| t as i32),
                access: param.access.map(|a| a as i32),
                is_online: param.is_online,
                minimum: param.minimum.as_ref().and_then(glow_value_to_json),
                maximum: param.maximum.as_ref().and_then(glow_value_to_json),
                enum_options: param.enumeration.clone(),
                enum_values: param.enum_map.as_ref().map(|pairs| pairs.iter().map(|(_, code)| *code).collect()),
                stream_identifier: param.stream_identifier,
            }),
            StoredElement::Matrix(matrix) => {
                let mut connections = Vec::new();
                for (&target, sources) in &matrix.connections {
                    for conn in sources {
                        connections.push(ConnectionJson { target, source: conn.source });
                    }
                }
                matrices.push(MatrixJson {
                    path: path.to_string(),
                    identifier: matrix.identifier.clone(),
                    description: matrix.description.clone(),
                    matrix_type: matrix.matrix_type.map(|t| t as i32),
                    target_count: matrix.target_count,
                    source_count: matrix.source_count,
                    target_numbers: matrix.targets.clone(),
                    source_numbers: matrix.sources.clone(),
                    target_labels: matrix.target_labels.iter().map(|(n, l)| (n.to_string(), l.clone())).collect(),
                    source_labels: matrix.source_labels.iter().map(|(n, l)| (n.to_string(), l.clone())).collect(),
                    connections,
                });
            }
            StoredElement::Function(function) => {
                let (arg_names, arg_types) = split_tuple_items(function.arguments.as_deref());
                let (result_names, result_types) = split_tuple_items(function.result.as_deref());
                functions.push(FunctionJson {
                    path: path.to_string(),
                    identifier: function.identifier.clone(),
                    description: function.description.clone(),
                    arg_names,
                    arg_types,
                    result_names,
                    result_types,
                });
            }
        }
    }

    Snapshot {
        format_version: CURRENT_FORMAT_VERSION,
        device_name: device_name.to_string(),
        capture_time: capture_time.to_string(),
        host_address: host_address.to_string(),
        port,
        statistics: Statistics {
            nodes: nodes.len(),
            parameters: parameters.len(),
            matrices: matrices.len(),
            functions: functions.len(),
        },
        root_paths: root_paths.iter().map(Path::to_string).collect(),
        nodes,
        parameters,
        matrices,
        functions,
    }
}

/// Rebuild a `DeviceStore` from a snapshot. Elements are inserted directly
/// (bypassing `DeviceStore::ingest`, which expects a freshly decoded Glow
/// tree) since a snapshot already records every field and every child
/// relationship explicitly.
pub fn to_store(snapshot: &Snapshot) -> SnapshotResult<DeviceStore> {
    let mut store = DeviceStore::new();

    for node in &snapshot.nodes {
        let path = parse_path(&node.path)?;
        store
            .put_node(
                &path,
                &ember_glow::Node {
                    identifier: node.identifier.clone(),
                    description: node.description.clone(),
                    is_online: node.is_online,
                },
            )
            .map_err(|_| SnapshotError::InvalidPath(node.path.clone()))?;
    }
    for node in &snapshot.nodes {
        let path = parse_path(&node.path)?;
        let children = node.children.iter().map(|p| parse_path(p)).collect::<SnapshotResult<Vec<_>>>()?;
        store.set_children(&path, children).map_err(|_| SnapshotError::InvalidPath(node.path.clone()))?;
    }

    for param in &snapshot.parameters {
        let path = parse_path(&param.path)?;
        let enum_map = match (&param.enum_options, &param.enum_values) {
            (Some(names), Some(codes)) => {
                Some(names.iter().cloned().zip(codes.iter().copied()).collect())
            }
            _ => None,
        };
        store
            .put_parameter(
                &path,
                &ember_glow::Parameter {
                    identifier: param.identifier.clone(),
                    value: param.value.as_ref().map(json_to_glow_value),
                    minimum: param.minimum.as_ref().map(json_to_glow_value),
                    maximum: param.maximum.as_ref().map(json_to_glow_value),
                    access: param.access.and_then(ember_glow::Access::from_i32),
                    param_type: param.param_type.and_then(ember_glow::ParameterType::from_i32),
                    enumeration: param.enum_options.clone(),
                    enum_map,
                    is_online: param.is_online,
                    stream_identifier: param.stream_identifier,
                    format: None,
                    formula: None,
                    factor: None,
                },
            )
            .map_err(|_| SnapshotError::InvalidPath(param.path.clone()))?;
    }

    for matrix in &snapshot.matrices {
        let path = parse_path(&matrix.path)?;
        store
            .put_matrix(
                &path,
                &ember_glow::Matrix {
                    identifier: matrix.identifier.clone(),
                    description: matrix.description.clone(),
                    matrix_type: matrix.matrix_type.and_then(ember_glow::MatrixType::from_i32),
                    target_count: matrix.target_count,
                    source_count: matrix.source_count,
                    targets: Some(matrix.target_numbers.clone()),
                    sources: Some(matrix.source_numbers.clone()),
                    connections: None,
                },
            )
            .map_err(|_| SnapshotError::InvalidPath(matrix.path.clone()))?;

        if let Some(stored) = store.matrix_mut(&path) {
            stored.target_labels = labels_from_json(&matrix.target_labels);
            stored.source_labels = labels_from_json(&matrix.source_labels);
            for conn in &matrix.connections {
                stored.connections.entry(conn.target).or_default().push(ember_model::MatrixConnection {
                    source: conn.source,
                    disposition: ember_glow::Disposition::Tally,
                });
            }
        }
    }

    for function in &snapshot.functions {
        let path = parse_path(&function.path)?;
        store
            .put_function(
                &path,
                &ember_glow::Function {
                    identifier: function.identifier.clone(),
                    description: function.description.clone(),
                    arguments: Some(join_tuple_items(&function.arg_names, &function.arg_types)),
                    result: Some(join_tuple_items(&function.result_names, &function.result_types)),
                },
            )
            .map_err(|_| SnapshotError::InvalidPath(function.path.clone()))?;
    }

    let roots = snapshot.root_paths.iter().map(|p| parse_path(p)).collect::<SnapshotResult<Vec<_>>>()?;
    store.set_root_order(roots);

    Ok(store)
}

fn parse_path(s: &str) -> SnapshotResult<Path> {
    Path::parse(s).ok_or_else(|| SnapshotError::InvalidPath(s.to_string()))
}

fn glow_value_to_json(value: &GlowValue) -> Option<JsonValue> {
    match value {
        GlowValue::Integer(v) => Some(JsonValue::Integer(*v)),
        GlowValue::Real(v) => Some(JsonValue::Real(*v)),
        GlowValue::String(v) => Some(JsonValue::String(v.clone())),
        GlowValue::Boolean(v) => Some(JsonValue::Boolean(*v)),
        GlowValue::Trigger => Some(JsonValue::Trigger),
        GlowValue::Enum(v) => Some(JsonValue::Enum(*v)),
        GlowValue::Octets(v) => Some(JsonValue::Octets(v.clone())),
        GlowValue::None => None,
    }
}

fn json_to_glow_value(value: &JsonValue) -> GlowValue {
    match value {
        JsonValue::Integer(v) => GlowValue::Integer(*v),
        JsonValue::Real(v) => GlowValue::Real(*v),
        JsonValue::String(v) => GlowValue::String(v.clone()),
        JsonValue::Boolean(v) => GlowValue::Boolean(*v),
        JsonValue::Trigger => GlowValue::Trigger,
        JsonValue::Enum(v) => GlowValue::Enum(*v),
        JsonValue::Octets(v) => GlowValue::Octets(v.clone()),
    }
}

fn labels_from_json(labels: &BTreeMap<String, String>) -> BTreeMap<i32, String> {
    labels.iter().filter_map(|(k, v)| k.parse().ok().map(|n| (n, v.clone()))).collect()
}

fn split_tuple_items(items: Option<&[ember_glow::TupleItemDescription]>) -> (Vec<String>, Vec<i32>) {
    let Some(items) = items else { return (Vec::new(), Vec::new()) };
    let names = items.iter().map(|i| i.name.clone().unwrap_or_default()).collect();
    let types = items.iter().map(|i| i.item_type.unwrap_or_default()).collect();
    (names, types)
}

fn join_tuple_items(names: &[String], types: &[i32]) -> Vec<ember_glow::TupleItemDescription> {
    names
        .iter()
        .cloned()
        .zip(types.iter().copied())
        .map(|(name, item_type)| ember_glow::TupleItemDescription {
            name: Some(name),
            item_type: Some(item_type),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> DeviceStore {
        let mut store = DeviceStore::new();
        let root = Path::root(1);
        let gain = Path::parse("1.1").unwrap();
        store
            .put_node(&root, &ember_glow::Node { identifier: Some("device".to_string()), description: None, is_online: Some(true) })
            .unwrap();
        store
            .put_parameter(
                &gain,
                &ember_glow::Parameter {
                    identifier: Some("gain".to_string()),
                    value: Some(GlowValue::Real(-3.0)),
                    access: Some(ember_glow::Access::ReadWrite),
                    param_type: Some(ember_glow::ParameterType::Real),
                    is_online: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        store.set_children(&root, vec![gain]).unwrap();
        store.set_root_order(vec![root]);
        store
    }

    #[test]
    fn save_then_load_json_round_trips_the_text() {
        let store = sample_store();
        let snapshot = from_store(&store, "Test Device", "2026-08-01T00:00:00Z", "127.0.0.1", 9092);
        let text = save_json(&snapshot).unwrap();
        let loaded = load_json(&text).unwrap();
        assert_eq!(snapshot, loaded);
    }

    #[test]
    fn store_round_trips_through_a_snapshot() {
        let store = sample_store();
        let snapshot = from_store(&store, "Test Device", "2026-08-01T00:00:00Z", "127.0.0.1", 9092);
        let restored = to_store(&snapshot).unwrap();
        let restored_snapshot = from_store(&restored, "Test Device", "2026-08-01T00:00:00Z", "127.0.0.1", 9092);
        assert_eq!(snapshot, restored_snapshot);
    }

    #[test]
    fn matrix_connections_round_trip() {
        let mut store = DeviceStore::new();
        let path = Path::root(5);
        store
            .put_matrix(
                &path,
                &ember_glow::Matrix {
                    identifier: Some("router".to_string()),
                    matrix_type: Some(ember_glow::MatrixType::NToN),
                    targets: Some(vec![1, 2]),
                    sources: Some(vec![1, 2]),
                    ..Default::default()
                },
            )
            .unwrap();
        if let Some(matrix) = store.matrix_mut(&path) {
            matrix.connections.entry(1).or_default().push(ember_model::MatrixConnection {
                source: 2,
                disposition: ember_glow::Disposition::Tally,
            });
        }
        store.set_root_order(vec![path]);

        let snapshot = from_store(&store, "d", "2026-08-01T00:00:00Z", "h", 1);
        assert_eq!(snapshot.matrices[0].connections, vec![ConnectionJson { target: 1, source: 2 }]);

        let restored = to_store(&snapshot).unwrap();
        let restored_snapshot = from_store(&restored, "d", "2026-08-01T00:00:00Z", "h", 1);
        assert_eq!(snapshot, restored_snapshot);
    }
}
