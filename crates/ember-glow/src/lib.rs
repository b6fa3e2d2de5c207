//! Glow: the typed, BER-encoded Ember+ object model layered over `ember-ber`.
//!
//! Covers Node/Parameter/Matrix/Function (plain and qualified), Command,
//! InvocationResult, and StreamCollection — the element set a consumer or
//! provider engine actually needs to drive a device tree.

mod codec;
mod elements;
mod error;
mod matrix_labels;
mod path;
mod reader;
mod tags;
mod value;

pub use codec::{decode_root, encode_command, encode_invocation_result, encode_qualified, encode_root, encode_stream_collection};
pub use elements::{
    Command, Connection, Function, GlowElement, Invocation, InvocationResult, Matrix, Node,
    Parameter, StreamEntry, TupleItemDescription,
};
pub use error::{GlowError, GlowResult};
pub use matrix_labels::{
    label_container_path, parse_label_path, source_label_path, target_label_path,
    LABEL_CONTAINER_SEGMENT, SOURCES_SEGMENT, TARGETS_SEGMENT,
};
pub use path::Path;
pub use reader::GlowReader;
pub use tags::{command_type, glow_type, matrix_operation, Access, Disposition, MatrixType, ParameterType};
pub use value::GlowValue;
