//! Assembles a `DeviceStore` out of the discrete events a `Consumer`
//! reports, so a full tree fetch can be turned into one snapshot. The
//! engine never hands back a whole store directly (§4.6: single-task
//! ownership) — only the host layer sees the full picture, one event at a
//! time.

use std::collections::HashMap;

use ember_consumer::Event;
use ember_glow::{Disposition, Function, Matrix, Node, Parameter, Path};
use ember_model::DeviceStore;

#[derive(Default)]
pub struct TreeCollector {
    store: DeviceStore,
    discovered: Vec<Path>,
}

impl TreeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &Event) {
        match event {
            Event::Node(info) => {
                let _ = self.store.put_node(
                    &info.path,
                    &Node { identifier: info.identifier.clone(), description: info.description.clone(), is_online: info.is_online },
                );
                self.note(&info.path);
            }
            Event::Parameter(info) => {
                let _ = self.store.put_parameter(
                    &info.path,
                    &Parameter {
                        identifier: info.identifier.clone(),
                        value: info.value.clone(),
                        minimum: info.minimum.clone(),
                        maximum: info.maximum.clone(),
                        access: info.access,
                        param_type: info.param_type,
                        enumeration: info.enum_options.clone(),
                        enum_map: None,
                        is_online: info.is_online,
                        stream_identifier: info.stream_identifier,
                        format: None,
                        formula: None,
                        factor: None,
                    },
                );
                self.note(&info.path);
            }
            Event::Matrix(info) => {
                let _ = self.store.put_matrix(
                    &info.path,
                    &Matrix {
                        identifier: info.identifier.clone(),
                        description: info.description.clone(),
                        matrix_type: info.matrix_type,
                        target_count: info.target_count,
                        source_count: info.source_count,
                        targets: None,
                        sources: None,
                        connections: None,
                    },
                );
                self.note(&info.path);
            }
            Event::MatrixConnection(info) => {
                if let Some(matrix) = self.store.matrix_mut(&info.path) {
                    let sources = matrix.connections.entry(info.target).or_default();
                    if info.connected {
                        if !sources.iter().any(|c| c.source == info.source) {
                            sources.push(ember_model::MatrixConnection { source: info.source, disposition: Disposition::default() });
                        }
                    } else {
                        sources.retain(|c| c.source != info.source);
                    }
                }
            }
            Event::MatrixTarget { path, number, label } => {
                if let Some(matrix) = self.store.matrix_mut(path) {
                    if let Some(label) = label {
                        matrix.target_labels.insert(*number, label.clone());
                    }
                }
            }
            Event::MatrixSource { path, number, label } => {
                if let Some(matrix) = self.store.matrix_mut(path) {
                    if let Some(label) = label {
                        matrix.source_labels.insert(*number, label.clone());
                    }
                }
            }
            _ => {}
        }
    }

    /// Record a function discovered outside the `Event` stream proper (the
    /// consumer engine does not currently surface function metadata as an
    /// event of its own — functions are addressed directly by path when
    /// invoked). Exposed so a host that already knows a function's shape
    /// (e.g. from a prior snapshot) can still capture it.
    pub fn note_function(&mut self, path: &Path, function: &Function) {
        let _ = self.store.put_function(path, function);
        self.note(path);
    }

    fn note(&mut self, path: &Path) {
        if !self.discovered.contains(path) {
            self.discovered.push(path.clone());
        }
    }

    /// Rebuild parent/child and root linkage purely from the discovered
    /// paths' own structure, then hand back the finished store.
    pub fn finish(mut self) -> DeviceStore {
        let mut by_parent: HashMap<Option<Path>, Vec<Path>> = HashMap::new();
        for path in &self.discovered {
            by_parent.entry(path.parent()).or_default().push(path.clone());
        }
        let roots = by_parent.remove(&None).unwrap_or_default();
        for (parent, children) in by_parent {
            if let Some(parent) = parent {
                let _ = self.store.set_children(&parent, children);
            }
        }
        self.store.set_root_order(roots);
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_consumer::NodeInfo;

    #[test]
    fn collects_a_node_and_registers_it_as_a_root() {
        let mut collector = TreeCollector::new();
        collector.record(&Event::Node(NodeInfo {
            path: Path::root(1),
            identifier: Some("device".to_string()),
            description: None,
            is_online: Some(true),
        }));
        let store = collector.finish();
        assert_eq!(store.iter_roots().collect::<Vec<_>>(), vec![&Path::root(1)]);
    }

    #[test]
    fn child_paths_are_linked_under_their_parent() {
        let mut collector = TreeCollector::new();
        collector.record(&Event::Node(NodeInfo { path: Path::root(1), identifier: None, description: None, is_online: None }));
        collector.record(&Event::Node(NodeInfo {
            path: Path::parse("1.1").unwrap(),
            identifier: Some("sub".to_string()),
            description: None,
            is_online: None,
        }));
        let store = collector.finish();
        assert_eq!(store.children(&Path::root(1)), &[Path::parse("1.1").unwrap()]);
    }
}
