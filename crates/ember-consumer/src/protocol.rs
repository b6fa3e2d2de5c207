//! Builds the outgoing Glow element trees for each consumer-initiated
//! request. Command-only requests (GetDirectory, Subscribe, Unsubscribe) are
//! wrapped in a plain `Node` container — the wrapper's own kind never
//! matters to a command, only its address does.

use ember_glow::{
    command_type, matrix_operation, Command, Connection, Function, GlowElement, GlowValue,
    Invocation, Matrix, Node, Parameter, Path,
};

fn command_element(path: Path, number: i32) -> GlowElement {
    GlowElement::Node {
        path: path.clone(),
        contents: Node::default(),
        children: vec![GlowElement::Command { path, command: Command { number, invocation: None, dir_field_mask: None } }],
    }
}

pub fn get_directory(path: &Path) -> GlowElement {
    command_element(path.clone(), command_type::GET_DIRECTORY)
}

pub fn subscribe(path: &Path) -> GlowElement {
    command_element(path.clone(), command_type::SUBSCRIBE)
}

pub fn unsubscribe(path: &Path) -> GlowElement {
    command_element(path.clone(), command_type::UNSUBSCRIBE)
}

pub fn write_parameter(path: &Path, value: GlowValue) -> GlowElement {
    GlowElement::Parameter {
        path: path.clone(),
        contents: Parameter { value: Some(value), ..Default::default() },
        children: Vec::new(),
    }
}

pub fn invoke(path: &Path, invocation_id: i32, arguments: Vec<GlowValue>) -> GlowElement {
    GlowElement::Function {
        path: path.clone(),
        contents: Function::default(),
        children: vec![GlowElement::Command {
            path: path.clone(),
            command: Command {
                number: command_type::INVOKE,
                invocation: Some(Invocation { id: invocation_id, arguments }),
                dir_field_mask: None,
            },
        }],
    }
}

pub fn matrix_connection(path: &Path, target: i32, source: i32, connect: bool) -> GlowElement {
    let operation = if connect { matrix_operation::CONNECT } else { matrix_operation::DISCONNECT };
    GlowElement::Matrix {
        path: path.clone(),
        contents: Matrix {
            connections: Some(vec![Connection { target, sources: vec![source], operation: Some(operation), disposition: None }]),
            ..Default::default()
        },
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_directory_wraps_command_under_a_node() {
        let element = get_directory(&Path::root(1));
        match element {
            GlowElement::Node { path, children, .. } => {
                assert_eq!(path, Path::root(1));
                match &children[0] {
                    GlowElement::Command { command, .. } => assert_eq!(command.number, command_type::GET_DIRECTORY),
                    _ => panic!("expected command child"),
                }
            }
            _ => panic!("expected node"),
        }
    }

    #[test]
    fn matrix_connection_request_carries_the_requested_operation() {
        let element = matrix_connection(&Path::root(5), 1, 2, true);
        match element {
            GlowElement::Matrix { contents, .. } => {
                let conn = &contents.connections.unwrap()[0];
                assert_eq!(conn.target, 1);
                assert_eq!(conn.sources, vec![2]);
                assert_eq!(conn.operation, Some(matrix_operation::CONNECT));
            }
            _ => panic!("expected matrix"),
        }
    }
}
