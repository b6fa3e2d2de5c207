//! Matrix connection mutation: applying an incoming `Connection` (Absolute,
//! Connect or Disconnect) to a stored matrix's target -> sources map,
//! honoring the clearing rules that differ by `MatrixType`.

use ember_glow::{matrix_operation, Disposition, MatrixType};

use crate::element::{MatrixConnection, StoredMatrix};
use crate::error::{ModelError, ModelResult};

/// Apply one connection operation to `matrix`, returning the disposition to
/// report back to the caller. `target` must already be a known target of the
/// matrix.
pub fn apply_connection(
    matrix: &mut StoredMatrix,
    target: i32,
    sources: &[i32],
    operation: i32,
) -> ModelResult<Disposition> {
    if !matrix.targets.is_empty() && !matrix.targets.contains(&target) {
        return Err(ModelError::UnknownTarget {
            path: ember_glow::Path::root(target as u32),
            target,
        });
    }

    let matrix_type = matrix.matrix_type.unwrap_or_default();

    match operation {
        matrix_operation::ABSOLUTE => {
            set_sources(matrix, target, sources);
        }
        matrix_operation::CONNECT => match matrix_type {
            MatrixType::OneToN => {
                set_sources(matrix, target, sources);
            }
            MatrixType::OneToOne => {
                // Each incoming source can serve only one target: disconnect
                // it from wherever it's currently connected first.
                for &source in sources {
                    disconnect_source_everywhere(matrix, source);
                }
                set_sources(matrix, target, sources);
            }
            MatrixType::NToN => {
                add_sources(matrix, target, sources);
            }
        },
        matrix_operation::DISCONNECT => {
            remove_sources(matrix, target, sources);
        }
        _ => {}
    }

    Ok(Disposition::Tally)
}

fn set_sources(matrix: &mut StoredMatrix, target: i32, sources: &[i32]) {
    let entry = matrix.connections.entry(target).or_default();
    entry.clear();
    for &source in sources {
        entry.push(MatrixConnection { source, disposition: Disposition::Tally });
    }
}

fn add_sources(matrix: &mut StoredMatrix, target: i32, sources: &[i32]) {
    let entry = matrix.connections.entry(target).or_default();
    for &source in sources {
        if !entry.iter().any(|c| c.source == source) {
            entry.push(MatrixConnection { source, disposition: Disposition::Tally });
        }
    }
}

fn remove_sources(matrix: &mut StoredMatrix, target: i32, sources: &[i32]) {
    if let Some(entry) = matrix.connections.get_mut(&target) {
        entry.retain(|c| !sources.contains(&c.source));
    }
}

fn disconnect_source_everywhere(matrix: &mut StoredMatrix, source: i32) {
    for entry in matrix.connections.values_mut() {
        entry.retain(|c| c.source != source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_of(matrix_type: MatrixType) -> StoredMatrix {
        StoredMatrix { matrix_type: Some(matrix_type), ..Default::default() }
    }

    #[test]
    fn absolute_replaces_all_sources_for_a_target() {
        let mut matrix = matrix_of(MatrixType::NToN);
        apply_connection(&mut matrix, 1, &[1, 2], matrix_operation::ABSOLUTE).unwrap();
        apply_connection(&mut matrix, 1, &[3], matrix_operation::ABSOLUTE).unwrap();
        assert_eq!(matrix.connections[&1].iter().map(|c| c.source).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn one_to_n_connect_clears_existing_sources_for_target() {
        let mut matrix = matrix_of(MatrixType::OneToN);
        apply_connection(&mut matrix, 1, &[1], matrix_operation::CONNECT).unwrap();
        apply_connection(&mut matrix, 1, &[2], matrix_operation::CONNECT).unwrap();
        assert_eq!(matrix.connections[&1].iter().map(|c| c.source).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn one_to_one_connect_clears_previous_target_of_a_reused_source() {
        let mut matrix = matrix_of(MatrixType::OneToOne);
        apply_connection(&mut matrix, 1, &[5], matrix_operation::CONNECT).unwrap();
        apply_connection(&mut matrix, 2, &[5], matrix_operation::CONNECT).unwrap();
        assert!(matrix.connections[&1].is_empty());
        assert_eq!(matrix.connections[&2].iter().map(|c| c.source).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn n_to_n_connect_adds_without_clearing() {
        let mut matrix = matrix_of(MatrixType::NToN);
        apply_connection(&mut matrix, 1, &[1], matrix_operation::CONNECT).unwrap();
        apply_connection(&mut matrix, 1, &[2], matrix_operation::CONNECT).unwrap();
        let sources: Vec<_> = matrix.connections[&1].iter().map(|c| c.source).collect();
        assert_eq!(sources, vec![1, 2]);
    }

    #[test]
    fn disconnect_removes_only_the_named_pairs() {
        let mut matrix = matrix_of(MatrixType::NToN);
        apply_connection(&mut matrix, 1, &[1, 2, 3], matrix_operation::CONNECT).unwrap();
        apply_connection(&mut matrix, 1, &[2], matrix_operation::DISCONNECT).unwrap();
        let sources: Vec<_> = matrix.connections[&1].iter().map(|c| c.source).collect();
        assert_eq!(sources, vec![1, 3]);
    }

    #[test]
    fn unknown_target_is_rejected_when_targets_are_declared() {
        let mut matrix = matrix_of(MatrixType::OneToN);
        matrix.targets = vec![1, 2];
        let err = apply_connection(&mut matrix, 9, &[1], matrix_operation::CONNECT).unwrap_err();
        assert!(matches!(err, ModelError::UnknownTarget { target: 9, .. }));
    }
}
