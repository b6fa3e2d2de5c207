//! Small device-tree snapshots reused across several crates' integration
//! tests, so each test doesn't hand-roll its own JSON.

use ember_snapshot::{MatrixJson, NodeJson, ParameterJson, Snapshot, CURRENT_FORMAT_VERSION};

/// One root node ("mixer") with a single online, read-write gain
/// parameter underneath it ("mixer/gain").
pub fn single_parameter_snapshot() -> Snapshot {
    Snapshot {
        format_version: CURRENT_FORMAT_VERSION,
        device_name: "fixture device".to_string(),
        capture_time: "2026-01-01T00:00:00Z".to_string(),
        host_address: "127.0.0.1".to_string(),
        port: ember_provider::DEFAULT_PORT,
        root_paths: vec!["1".to_string()],
        nodes: vec![NodeJson {
            path: "1".to_string(),
            identifier: Some("mixer".to_string()),
            is_online: Some(true),
            children: vec!["1.1".to_string()],
            ..Default::default()
        }],
        parameters: vec![ParameterJson {
            path: "1.1".to_string(),
            identifier: Some("gain".to_string()),
            param_type: Some(2),
            access: Some(3),
            is_online: Some(true),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// One root node with a 2x2 routing matrix underneath it, labels
/// included, with target 0 already connected to source 0.
pub fn matrix_snapshot() -> Snapshot {
    Snapshot {
        format_version: CURRENT_FORMAT_VERSION,
        device_name: "fixture router".to_string(),
        capture_time: "2026-01-01T00:00:00Z".to_string(),
        host_address: "127.0.0.1".to_string(),
        port: ember_provider::DEFAULT_PORT,
        root_paths: vec!["1".to_string()],
        nodes: vec![NodeJson {
            path: "1".to_string(),
            identifier: Some("router".to_string()),
            is_online: Some(true),
            children: vec!["1.1".to_string()],
            ..Default::default()
        }],
        matrices: vec![MatrixJson {
            path: "1.1".to_string(),
            identifier: Some("routing".to_string()),
            matrix_type: Some(0),
            target_count: Some(2),
            source_count: Some(2),
            target_numbers: vec![0, 1],
            source_numbers: vec![0, 1],
            target_labels: [("0".to_string(), "Output A".to_string()), ("1".to_string(), "Output B".to_string())]
                .into_iter()
                .collect(),
            source_labels: [("0".to_string(), "Input A".to_string()), ("1".to_string(), "Input B".to_string())]
                .into_iter()
                .collect(),
            connections: vec![ember_snapshot::ConnectionJson { target: 0, source: 0 }],
            ..Default::default()
        }],
        ..Default::default()
    }
}
