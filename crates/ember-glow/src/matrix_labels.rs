//! The synthetic matrix-label sub-tree: a matrix at path `P` exposes its
//! target/source labels as children of `P.666999666`, itself split into
//! `.1` (targets) and `.2` (sources), each holding `…/<number>` parameters
//! whose string value is the label. No real device element may use the path
//! segment `666999666`.

use crate::path::Path;

pub const LABEL_CONTAINER_SEGMENT: u32 = 666999666;
pub const TARGETS_SEGMENT: u32 = 1;
pub const SOURCES_SEGMENT: u32 = 2;

pub fn label_container_path(matrix_path: &Path) -> Path {
    matrix_path.child(LABEL_CONTAINER_SEGMENT)
}

pub fn target_label_path(matrix_path: &Path, number: i32) -> Path {
    label_container_path(matrix_path).child(TARGETS_SEGMENT).child(number as u32)
}

pub fn source_label_path(matrix_path: &Path, number: i32) -> Path {
    label_container_path(matrix_path).child(SOURCES_SEGMENT).child(number as u32)
}

/// If `path` names a target- or source-label parameter, return
/// `(matrix_path, is_target, number)`.
pub fn parse_label_path(path: &Path) -> Option<(Path, bool, i32)> {
    let numbers = path.numbers();
    if numbers.len() < 3 {
        return None;
    }
    let number = *numbers.last()?;
    let side = numbers[numbers.len() - 2];
    let container = numbers[numbers.len() - 3];
    if container != LABEL_CONTAINER_SEGMENT {
        return None;
    }
    let is_target = match side {
        TARGETS_SEGMENT => true,
        SOURCES_SEGMENT => false,
        _ => return None,
    };
    let matrix_path = Path::from_numbers(numbers[..numbers.len() - 3].to_vec());
    Some((matrix_path, is_target, number as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_and_source_paths_round_trip_through_parse() {
        let matrix = Path::root(5);
        let target = target_label_path(&matrix, 3);
        assert_eq!(parse_label_path(&target), Some((matrix.clone(), true, 3)));

        let source = source_label_path(&matrix, 7);
        assert_eq!(parse_label_path(&source), Some((matrix, false, 7)));
    }

    #[test]
    fn unrelated_paths_do_not_parse_as_labels() {
        assert_eq!(parse_label_path(&Path::parse("1.2.3").unwrap()), None);
    }
}
