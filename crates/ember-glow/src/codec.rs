//! Encode/decode between [`GlowElement`] trees and [`BerNode`] trees.
//!
//! Wire shape for every element (Node/Parameter/Matrix/Function and their
//! Qualified forms): an APPLICATION-tagged constructed value with up to three
//! context-tagged fields — `[0]` the addressing field (a relative `number`
//! for the plain form, a `path` RELATIVE-OID for the qualified form), `[1]`
//! a `contents` SEQUENCE of the element's own properties, and `[2]` an
//! optional `children` list nested the same way. Command/InvocationResult/
//! StreamCollection carry their fields directly at the top level.

use ember_ber::{universal, BerNode, Tag, TagClass};

use crate::elements::{
    Command, Connection, Function, GlowElement, Invocation, InvocationResult, Matrix, Node,
    Parameter, StreamEntry, TupleItemDescription,
};
use crate::error::{GlowError, GlowResult};
use crate::path::Path;
use crate::tags::{glow_type, Access, Disposition, MatrixType, ParameterType};
use crate::value::GlowValue;

const FIELD_ADDRESS: u32 = 0;
const FIELD_CONTENTS: u32 = 1;
const FIELD_CHILDREN: u32 = 2;

mod node_field {
    pub const IDENTIFIER: u32 = 0;
    pub const DESCRIPTION: u32 = 1;
    pub const IS_ONLINE: u32 = 2;
}

mod parameter_field {
    pub const IDENTIFIER: u32 = 0;
    pub const VALUE: u32 = 1;
    pub const MINIMUM: u32 = 2;
    pub const MAXIMUM: u32 = 3;
    pub const ACCESS: u32 = 4;
    pub const TYPE: u32 = 5;
    pub const ENUMERATION: u32 = 6;
    pub const FACTOR: u32 = 7;
    pub const IS_ONLINE: u32 = 8;
    pub const FORMAT: u32 = 9;
    pub const ENUM_MAP: u32 = 10;
    pub const STREAM_IDENTIFIER: u32 = 11;
    pub const FORMULA: u32 = 12;
}

mod matrix_field {
    pub const IDENTIFIER: u32 = 0;
    pub const DESCRIPTION: u32 = 1;
    pub const TYPE: u32 = 2;
    pub const TARGET_COUNT: u32 = 3;
    pub const SOURCE_COUNT: u32 = 4;
    pub const TARGETS: u32 = 5;
    pub const SOURCES: u32 = 6;
    pub const CONNECTIONS: u32 = 7;
}

mod connection_field {
    pub const TARGET: u32 = 0;
    pub const SOURCES: u32 = 1;
    pub const OPERATION: u32 = 2;
    pub const DISPOSITION: u32 = 3;
}

mod function_field {
    pub const IDENTIFIER: u32 = 0;
    pub const DESCRIPTION: u32 = 1;
    pub const ARGUMENTS: u32 = 2;
    pub const RESULT: u32 = 3;
}

mod tuple_item_field {
    pub const NAME: u32 = 0;
    pub const TYPE: u32 = 1;
}

mod command_field {
    pub const NUMBER: u32 = 0;
    pub const DIR_FIELD_MASK: u32 = 1;
    pub const INVOCATION: u32 = 2;
}

mod invocation_field {
    pub const ID: u32 = 0;
    pub const ARGUMENTS: u32 = 1;
}

mod invocation_result_field {
    pub const INVOCATION_ID: u32 = 0;
    pub const SUCCESS: u32 = 1;
    pub const RESULT: u32 = 2;
}

mod stream_entry_field {
    pub const STREAM_IDENTIFIER: u32 = 0;
    pub const VALUE: u32 = 1;
}

// ---- small helpers shared by every element encoder/decoder ----

fn ctx(n: u32, constructed: bool) -> Tag {
    Tag::context(n, constructed)
}

fn field_int(n: u32, value: i64) -> BerNode {
    BerNode::primitive(ctx(n, false), ember_ber::encode_integer(value))
}

fn field_bool(n: u32, value: bool) -> BerNode {
    BerNode::primitive(ctx(n, false), ember_ber::encode_boolean(value))
}

fn field_string(n: u32, value: &str) -> BerNode {
    BerNode::primitive(ctx(n, false), ember_ber::encode_utf8_string(value))
}

fn field_value(n: u32, value: &GlowValue) -> Option<BerNode> {
    value.encode().map(|inner| BerNode::constructed(ctx(n, true), vec![inner]))
}

fn field_int_seq(n: u32, values: &[i32]) -> BerNode {
    let children = values
        .iter()
        .map(|v| BerNode::primitive(Tag::universal(universal::INTEGER, false), ember_ber::encode_integer(i64::from(*v))))
        .collect();
    BerNode::constructed(ctx(n, true), children)
}

fn find_field<'a>(children: &'a [BerNode], n: u32) -> Option<&'a BerNode> {
    children
        .iter()
        .find(|c| c.tag().class == TagClass::Context && c.tag().number == n)
}

fn decode_field_int(children: &[BerNode], n: u32) -> GlowResult<Option<i64>> {
    match find_field(children, n) {
        Some(node) => Ok(Some(ember_ber::decode_integer(node.as_primitive()?)?)),
        None => Ok(None),
    }
}

fn decode_field_bool(children: &[BerNode], n: u32) -> GlowResult<Option<bool>> {
    match find_field(children, n) {
        Some(node) => Ok(Some(ember_ber::decode_boolean(node.as_primitive()?)?)),
        None => Ok(None),
    }
}

fn decode_field_string(children: &[BerNode], n: u32) -> GlowResult<Option<String>> {
    match find_field(children, n) {
        Some(node) => Ok(Some(ember_ber::decode_utf8_string(node.as_primitive()?)?)),
        None => Ok(None),
    }
}

fn decode_field_value(children: &[BerNode], n: u32) -> GlowResult<Option<GlowValue>> {
    match find_field(children, n) {
        Some(node) => {
            let inner = node.as_constructed()?;
            match inner.first() {
                Some(value_node) => Ok(Some(GlowValue::decode(value_node)?)),
                None => Ok(None),
            }
        }
        None => Ok(None),
    }
}

fn decode_field_int_seq(children: &[BerNode], n: u32) -> GlowResult<Option<Vec<i32>>> {
    match find_field(children, n) {
        Some(node) => {
            let items = node.as_constructed()?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(ember_ber::decode_integer(item.as_primitive()?)? as i32);
            }
            Ok(Some(out))
        }
        None => Ok(None),
    }
}

// ---- Node ----

fn encode_node_contents(node: &Node) -> Vec<BerNode> {
    let mut fields = Vec::new();
    if let Some(id) = &node.identifier {
        fields.push(field_string(node_field::IDENTIFIER, id));
    }
    if let Some(desc) = &node.description {
        fields.push(field_string(node_field::DESCRIPTION, desc));
    }
    if let Some(online) = node.is_online {
        fields.push(field_bool(node_field::IS_ONLINE, online));
    }
    fields
}

fn decode_node_contents(children: &[BerNode]) -> GlowResult<Node> {
    Ok(Node {
        identifier: decode_field_string(children, node_field::IDENTIFIER)?,
        description: decode_field_string(children, node_field::DESCRIPTION)?,
        is_online: decode_field_bool(children, node_field::IS_ONLINE)?,
    })
}

// ---- Parameter ----

fn encode_parameter_contents(parameter: &Parameter) -> Vec<BerNode> {
    let mut fields = Vec::new();
    if let Some(id) = &parameter.identifier {
        fields.push(field_string(parameter_field::IDENTIFIER, id));
    }
    if let Some(value) = &parameter.value {
        if let Some(node) = field_value(parameter_field::VALUE, value) {
            fields.push(node);
        }
    }
    if let Some(value) = &parameter.minimum {
        if let Some(node) = field_value(parameter_field::MINIMUM, value) {
            fields.push(node);
        }
    }
    if let Some(value) = &parameter.maximum {
        if let Some(node) = field_value(parameter_field::MAXIMUM, value) {
            fields.push(node);
        }
    }
    if let Some(access) = parameter.access {
        fields.push(field_int(parameter_field::ACCESS, access as i64));
    }
    if let Some(ty) = parameter.param_type {
        fields.push(field_int(parameter_field::TYPE, ty as i64));
    }
    if let Some(options) = &parameter.enumeration {
        fields.push(field_string(parameter_field::ENUMERATION, &options.join("\n")));
    }
    if let Some(pairs) = &parameter.enum_map {
        let children = pairs
            .iter()
            .map(|(name, code)| {
                BerNode::constructed(
                    Tag::application(glow_type::STRING_INTEGER_PAIR, true),
                    vec![
                        field_string(0, name),
                        field_int(1, i64::from(*code)),
                    ],
                )
            })
            .collect();
        fields.push(BerNode::constructed(ctx(parameter_field::ENUM_MAP, true), children));
    }
    if let Some(online) = parameter.is_online {
        fields.push(field_bool(parameter_field::IS_ONLINE, online));
    }
    if let Some(stream_id) = parameter.stream_identifier {
        fields.push(field_int(parameter_field::STREAM_IDENTIFIER, i64::from(stream_id)));
    }
    if let Some(format) = &parameter.format {
        fields.push(field_string(parameter_field::FORMAT, format));
    }
    if let Some(formula) = &parameter.formula {
        fields.push(field_string(parameter_field::FORMULA, formula));
    }
    if let Some(factor) = parameter.factor {
        fields.push(BerNode::constructed(
            ctx(parameter_field::FACTOR, true),
            vec![BerNode::primitive(
                Tag::universal(universal::REAL, false),
                ember_ber::encode_real(factor).unwrap_or_default(),
            )],
        ));
    }
    fields
}

fn decode_parameter_contents(children: &[BerNode]) -> GlowResult<Parameter> {
    let param_type = decode_field_int(children, parameter_field::TYPE)?
        .map(|v| v as i32)
        .and_then(ParameterType::from_i32);

    let value = match find_field(children, parameter_field::VALUE) {
        Some(node) => {
            let inner = node.as_constructed()?;
            match inner.first() {
                Some(value_node) if param_type == Some(ParameterType::Enum) => {
                    Some(GlowValue::decode_as_enum(value_node)?)
                }
                Some(value_node) => Some(GlowValue::decode(value_node)?),
                None => None,
            }
        }
        None => None,
    };

    let enum_map = match find_field(children, parameter_field::ENUM_MAP) {
        Some(node) => {
            let mut pairs = Vec::new();
            for pair_node in node.as_constructed()? {
                let pair_children = pair_node.as_constructed()?;
                let name = decode_field_string(pair_children, 0)?
                    .ok_or(GlowError::MissingField { element: "StringIntegerPair", field: "name" })?;
                let code = decode_field_int(pair_children, 1)?
                    .ok_or(GlowError::MissingField { element: "StringIntegerPair", field: "value" })?
                    as i32;
                pairs.push((name, code));
            }
            Some(pairs)
        }
        None => None,
    };

    let factor = match find_field(children, parameter_field::FACTOR) {
        Some(node) => {
            let inner = node.as_constructed()?;
            match inner.first() {
                Some(real_node) => Some(ember_ber::decode_real(real_node.as_primitive()?)?),
                None => None,
            }
        }
        None => None,
    };

    Ok(Parameter {
        identifier: decode_field_string(children, parameter_field::IDENTIFIER)?,
        value,
        minimum: decode_field_value(children, parameter_field::MINIMUM)?,
        maximum: decode_field_value(children, parameter_field::MAXIMUM)?,
        access: decode_field_int(children, parameter_field::ACCESS)?
            .map(|v| v as i32)
            .and_then(Access::from_i32),
        param_type,
        enumeration: decode_field_string(children, parameter_field::ENUMERATION)?
            .map(|joined| joined.split('\n').map(str::to_string).collect()),
        enum_map,
        is_online: decode_field_bool(children, parameter_field::IS_ONLINE)?,
        stream_identifier: decode_field_int(children, parameter_field::STREAM_IDENTIFIER)?.map(|v| v as i32),
        format: decode_field_string(children, parameter_field::FORMAT)?,
        formula: decode_field_string(children, parameter_field::FORMULA)?,
        factor,
    })
}

// ---- Matrix ----

fn encode_connection(connection: &Connection) -> BerNode {
    let mut fields = vec![field_int(connection_field::TARGET, i64::from(connection.target))];
    fields.push(field_int_seq(connection_field::SOURCES, &connection.sources));
    if let Some(op) = connection.operation {
        fields.push(field_int(connection_field::OPERATION, i64::from(op)));
    }
    if let Some(disposition) = connection.disposition {
        fields.push(field_int(connection_field::DISPOSITION, disposition as i64));
    }
    BerNode::constructed(Tag::application(glow_type::CONNECTION, true), fields)
}

fn decode_connection(node: &BerNode) -> GlowResult<Connection> {
    let children = node.as_constructed()?;
    let target = decode_field_int(children, connection_field::TARGET)?
        .ok_or(GlowError::MissingField { element: "Connection", field: "target" })? as i32;
    let sources = decode_field_int_seq(children, connection_field::SOURCES)?.unwrap_or_default();
    let operation = decode_field_int(children, connection_field::OPERATION)?.map(|v| v as i32);
    let disposition = decode_field_int(children, connection_field::DISPOSITION)?
        .map(|v| v as i32)
        .and_then(Disposition::from_i32);
    Ok(Connection { target, sources, operation, disposition })
}

fn encode_matrix_contents(matrix: &Matrix) -> Vec<BerNode> {
    let mut fields = Vec::new();
    if let Some(id) = &matrix.identifier {
        fields.push(field_string(matrix_field::IDENTIFIER, id));
    }
    if let Some(desc) = &matrix.description {
        fields.push(field_string(matrix_field::DESCRIPTION, desc));
    }
    if let Some(ty) = matrix.matrix_type {
        fields.push(field_int(matrix_field::TYPE, ty as i64));
    }
    if let Some(count) = matrix.target_count {
        fields.push(field_int(matrix_field::TARGET_COUNT, i64::from(count)));
    }
    if let Some(count) = matrix.source_count {
        fields.push(field_int(matrix_field::SOURCE_COUNT, i64::from(count)));
    }
    if let Some(targets) = &matrix.targets {
        fields.push(field_int_seq(matrix_field::TARGETS, targets));
    }
    if let Some(sources) = &matrix.sources {
        fields.push(field_int_seq(matrix_field::SOURCES, sources));
    }
    if let Some(connections) = &matrix.connections {
        let children = connections.iter().map(encode_connection).collect();
        fields.push(BerNode::constructed(ctx(matrix_field::CONNECTIONS, true), children));
    }
    fields
}

fn decode_matrix_contents(children: &[BerNode]) -> GlowResult<Matrix> {
    let connections = match find_field(children, matrix_field::CONNECTIONS) {
        Some(node) => {
            let mut out = Vec::new();
            for conn_node in node.as_constructed()? {
                out.push(decode_connection(conn_node)?);
            }
            Some(out)
        }
        None => None,
    };
    Ok(Matrix {
        identifier: decode_field_string(children, matrix_field::IDENTIFIER)?,
        description: decode_field_string(children, matrix_field::DESCRIPTION)?,
        matrix_type: decode_field_int(children, matrix_field::TYPE)?
            .map(|v| v as i32)
            .and_then(MatrixType::from_i32),
        target_count: decode_field_int(children, matrix_field::TARGET_COUNT)?.map(|v| v as i32),
        source_count: decode_field_int(children, matrix_field::SOURCE_COUNT)?.map(|v| v as i32),
        targets: decode_field_int_seq(children, matrix_field::TARGETS)?,
        sources: decode_field_int_seq(children, matrix_field::SOURCES)?,
        connections,
    })
}

// ---- Function ----

fn encode_tuple_item(item: &TupleItemDescription) -> BerNode {
    let mut fields = Vec::new();
    if let Some(name) = &item.name {
        fields.push(field_string(tuple_item_field::NAME, name));
    }
    if let Some(ty) = item.item_type {
        fields.push(field_int(tuple_item_field::TYPE, i64::from(ty)));
    }
    BerNode::constructed(Tag::application(glow_type::TUPLE_ITEM_DESCRIPTION, true), fields)
}

fn decode_tuple_item(node: &BerNode) -> GlowResult<TupleItemDescription> {
    let children = node.as_constructed()?;
    Ok(TupleItemDescription {
        name: decode_field_string(children, tuple_item_field::NAME)?,
        item_type: decode_field_int(children, tuple_item_field::TYPE)?.map(|v| v as i32),
    })
}

fn encode_function_contents(function: &Function) -> Vec<BerNode> {
    let mut fields = Vec::new();
    if let Some(id) = &function.identifier {
        fields.push(field_string(function_field::IDENTIFIER, id));
    }
    if let Some(desc) = &function.description {
        fields.push(field_string(function_field::DESCRIPTION, desc));
    }
    if let Some(args) = &function.arguments {
        let children = args.iter().map(encode_tuple_item).collect();
        fields.push(BerNode::constructed(ctx(function_field::ARGUMENTS, true), children));
    }
    if let Some(result) = &function.result {
        let children = result.iter().map(encode_tuple_item).collect();
        fields.push(BerNode::constructed(ctx(function_field::RESULT, true), children));
    }
    fields
}

fn decode_function_contents(children: &[BerNode]) -> GlowResult<Function> {
    let arguments = match find_field(children, function_field::ARGUMENTS) {
        Some(node) => {
            let mut out = Vec::new();
            for item in node.as_constructed()? {
                out.push(decode_tuple_item(item)?);
            }
            Some(out)
        }
        None => None,
    };
    let result = match find_field(children, function_field::RESULT) {
        Some(node) => {
            let mut out = Vec::new();
            for item in node.as_constructed()? {
                out.push(decode_tuple_item(item)?);
            }
            Some(out)
        }
        None => None,
    };
    Ok(Function {
        identifier: decode_field_string(children, function_field::IDENTIFIER)?,
        description: decode_field_string(children, function_field::DESCRIPTION)?,
        arguments,
        result,
    })
}

// ---- Command / Invocation / InvocationResult / StreamCollection ----

pub fn encode_command(command: &Command) -> BerNode {
    let mut fields = vec![field_int(command_field::NUMBER, i64::from(command.number))];
    if let Some(mask) = command.dir_field_mask {
        fields.push(field_int(command_field::DIR_FIELD_MASK, i64::from(mask)));
    }
    if let Some(invocation) = &command.invocation {
        let arg_children: Vec<BerNode> = invocation
            .arguments
            .iter()
            .filter_map(GlowValue::encode)
            .collect();
        let invocation_node = BerNode::constructed(
            Tag::application(glow_type::INVOCATION, true),
            vec![
                field_int(invocation_field::ID, i64::from(invocation.id)),
                BerNode::constructed(ctx(invocation_field::ARGUMENTS, true), arg_children),
            ],
        );
        fields.push(BerNode::constructed(ctx(command_field::INVOCATION, true), vec![invocation_node]));
    }
    BerNode::constructed(Tag::application(glow_type::COMMAND, true), fields)
}

fn decode_command(node: &BerNode) -> GlowResult<Command> {
    let children = node.as_constructed()?;
    let number = decode_field_int(children, command_field::NUMBER)?
        .ok_or(GlowError::MissingField { element: "Command", field: "number" })? as i32;
    let dir_field_mask = decode_field_int(children, command_field::DIR_FIELD_MASK)?.map(|v| v as i32);
    let invocation = match find_field(children, command_field::INVOCATION) {
        Some(wrapper) => {
            let inner = wrapper.as_constructed()?;
            let invocation_node = inner
                .first()
                .ok_or(GlowError::MissingField { element: "Command", field: "invocation" })?;
            let inv_children = invocation_node.as_constructed()?;
            let id = decode_field_int(inv_children, invocation_field::ID)?
                .ok_or(GlowError::MissingField { element: "Invocation", field: "invocationId" })? as i32;
            let arguments = match find_field(inv_children, invocation_field::ARGUMENTS) {
                Some(args_node) => {
                    let mut out = Vec::new();
                    for arg in args_node.as_constructed()? {
                        out.push(GlowValue::decode(arg)?);
                    }
                    out
                }
                None => Vec::new(),
            };
            Some(Invocation { id, arguments })
        }
        None => None,
    };
    Ok(Command { number, invocation, dir_field_mask })
}

pub fn encode_invocation_result(result: &InvocationResult) -> BerNode {
    let mut fields = vec![field_int(invocation_result_field::INVOCATION_ID, i64::from(result.invocation_id))];
    if let Some(success) = result.success {
        fields.push(field_bool(invocation_result_field::SUCCESS, success));
    }
    if let Some(values) = &result.result {
        let children: Vec<BerNode> = values.iter().filter_map(GlowValue::encode).collect();
        fields.push(BerNode::constructed(ctx(invocation_result_field::RESULT, true), children));
    }
    BerNode::constructed(Tag::application(glow_type::INVOCATION_RESULT, true), fields)
}

fn decode_invocation_result(node: &BerNode) -> GlowResult<InvocationResult> {
    let children = node.as_constructed()?;
    let invocation_id = decode_field_int(children, invocation_result_field::INVOCATION_ID)?
        .ok_or(GlowError::MissingField { element: "InvocationResult", field: "invocationId" })? as i32;
    let success = decode_field_bool(children, invocation_result_field::SUCCESS)?;
    let result = match find_field(children, invocation_result_field::RESULT) {
        Some(node) => {
            let mut out = Vec::new();
            for value in node.as_constructed()? {
                out.push(GlowValue::decode(value)?);
            }
            Some(out)
        }
        None => None,
    };
    Ok(InvocationResult { invocation_id, success, result })
}

fn encode_stream_entry(entry: &StreamEntry) -> BerNode {
    let mut fields = vec![field_int(stream_entry_field::STREAM_IDENTIFIER, i64::from(entry.stream_identifier))];
    if let Some(node) = field_value(stream_entry_field::VALUE, &entry.value) {
        fields.push(node);
    }
    BerNode::constructed(Tag::application(glow_type::STREAM_ENTRY, true), fields)
}

fn decode_stream_entry(node: &BerNode) -> GlowResult<StreamEntry> {
    let children = node.as_constructed()?;
    let stream_identifier = decode_field_int(children, stream_entry_field::STREAM_IDENTIFIER)?
        .ok_or(GlowError::MissingField { element: "StreamEntry", field: "streamIdentifier" })? as i32;
    let value = decode_field_value(children, stream_entry_field::VALUE)?.unwrap_or(GlowValue::None);
    Ok(StreamEntry { stream_identifier, value })
}

pub fn encode_stream_collection(entries: &[StreamEntry]) -> BerNode {
    let children = entries.iter().map(encode_stream_entry).collect();
    BerNode::constructed(Tag::application(glow_type::STREAM_COLLECTION, true), children)
}

// ---- top-level element dispatch ----

fn encode_wrapper(app_tag: u32, address: BerNode, contents: Vec<BerNode>, children: Vec<BerNode>) -> BerNode {
    let mut fields = vec![address];
    if !contents.is_empty() {
        fields.push(BerNode::constructed(ctx(FIELD_CONTENTS, true), contents));
    }
    if !children.is_empty() {
        fields.push(BerNode::constructed(ctx(FIELD_CHILDREN, true), children));
    }
    BerNode::constructed(Tag::application(app_tag, true), fields)
}

/// Encode a Glow element as its qualified wire form (absolute path), which is
/// what the provider and consumer use for every response and pinpoint request.
pub fn encode_qualified(element: &GlowElement) -> GlowResult<BerNode> {
    let path_node = |path: &Path| {
        BerNode::primitive(ctx(FIELD_ADDRESS, false), ember_ber::encode_relative_oid(path.numbers()))
    };
    Ok(match element {
        GlowElement::Node { path, contents, children } => encode_wrapper(
            glow_type::QUALIFIED_NODE,
            path_node(path),
            encode_node_contents(contents),
            encode_children(children)?,
        ),
        GlowElement::Parameter { path, contents, children } => encode_wrapper(
            glow_type::QUALIFIED_PARAMETER,
            path_node(path),
            encode_parameter_contents(contents),
            encode_children(children)?,
        ),
        GlowElement::Matrix { path, contents, children } => encode_wrapper(
            glow_type::QUALIFIED_MATRIX,
            path_node(path),
            encode_matrix_contents(contents),
            encode_children(children)?,
        ),
        GlowElement::Function { path, contents, children } => encode_wrapper(
            glow_type::QUALIFIED_FUNCTION,
            path_node(path),
            encode_function_contents(contents),
            encode_children(children)?,
        ),
        GlowElement::Command { command, .. } => encode_command(command),
        GlowElement::InvocationResult(result) => encode_invocation_result(result),
        GlowElement::StreamCollection(entries) => encode_stream_collection(entries),
    })
}

fn encode_children(children: &[GlowElement]) -> GlowResult<Vec<BerNode>> {
    children.iter().map(encode_qualified).collect()
}

/// Encode a list of elements as a `RootElementCollection`.
pub fn encode_root(elements: &[GlowElement]) -> GlowResult<BerNode> {
    let children = elements
        .iter()
        .map(encode_qualified)
        .collect::<GlowResult<Vec<_>>>()?;
    Ok(BerNode::constructed(Tag::application(glow_type::ROOT_ELEMENT_COLLECTION, true), children))
}

/// Decode a `RootElementCollection` (or a bare application element, for
/// leniency) into a flat list of top-level [`GlowElement`]s.
pub fn decode_root(node: &BerNode) -> GlowResult<Vec<GlowElement>> {
    let tag = node.tag();
    if tag.class != TagClass::Application {
        return Err(GlowError::UnrecognizedTag(tag.number));
    }
    if tag.number == glow_type::ROOT_ELEMENT_COLLECTION || tag.number == glow_type::ELEMENT_COLLECTION {
        node.as_constructed()?.iter().map(|c| decode_element(c, None)).collect()
    } else {
        Ok(vec![decode_element(node, None)?])
    }
}

fn decode_element(node: &BerNode, parent_path: Option<&Path>) -> GlowResult<GlowElement> {
    let tag = node.tag();
    if tag.class != TagClass::Application {
        return Err(GlowError::UnrecognizedTag(tag.number));
    }
    match tag.number {
        n if n == glow_type::COMMAND => {
            let path = parent_path.cloned().unwrap_or_else(|| Path::from_numbers(Vec::new()));
            Ok(GlowElement::Command { path, command: decode_command(node)? })
        }
        n if n == glow_type::INVOCATION_RESULT => Ok(GlowElement::InvocationResult(decode_invocation_result(node)?)),
        n if n == glow_type::STREAM_COLLECTION => {
            let entries = node
                .as_constructed()?
                .iter()
                .map(decode_stream_entry)
                .collect::<GlowResult<Vec<_>>>()?;
            Ok(GlowElement::StreamCollection(entries))
        }
        n if n == glow_type::NODE || n == glow_type::QUALIFIED_NODE => {
            let (path, fields) = resolve_address(node, n == glow_type::QUALIFIED_NODE, parent_path)?;
            let contents = decode_node_contents(find_contents(fields)?)?;
            let children = decode_nested_children(fields, &path)?;
            Ok(GlowElement::Node { path, contents, children })
        }
        n if n == glow_type::PARAMETER || n == glow_type::QUALIFIED_PARAMETER => {
            let (path, fields) = resolve_address(node, n == glow_type::QUALIFIED_PARAMETER, parent_path)?;
            let contents = decode_parameter_contents(find_contents(fields)?)?;
            let children = decode_nested_children(fields, &path)?;
            Ok(GlowElement::Parameter { path, contents, children })
        }
        n if n == glow_type::MATRIX || n == glow_type::QUALIFIED_MATRIX => {
            let (path, fields) = resolve_address(node, n == glow_type::QUALIFIED_MATRIX, parent_path)?;
            let contents = decode_matrix_contents(find_contents(fields)?)?;
            let children = decode_nested_children(fields, &path)?;
            Ok(GlowElement::Matrix { path, contents, children })
        }
        n if n == glow_type::FUNCTION || n == glow_type::QUALIFIED_FUNCTION => {
            let (path, fields) = resolve_address(node, n == glow_type::QUALIFIED_FUNCTION, parent_path)?;
            let contents = decode_function_contents(find_contents(fields)?)?;
            let children = decode_nested_children(fields, &path)?;
            Ok(GlowElement::Function { path, contents, children })
        }
        other => Err(GlowError::UnrecognizedTag(other)),
    }
}

fn resolve_address<'a>(
    node: &'a BerNode,
    qualified: bool,
    parent_path: Option<&Path>,
) -> GlowResult<(Path, &'a [BerNode])> {
    let fields = node.as_constructed()?;
    let address = find_field(fields, FIELD_ADDRESS).ok_or(GlowError::MissingField {
        element: "element",
        field: "number/path",
    })?;
    let contents = address.as_primitive()?;
    let path = if qualified {
        Path::from_numbers(ember_ber::decode_relative_oid(contents)?)
    } else {
        let number = ember_ber::decode_integer(contents)? as u32;
        match parent_path {
            Some(parent) => parent.child(number),
            None => Path::root(number),
        }
    };
    Ok((path, fields))
}

fn find_contents(fields: &[BerNode]) -> GlowResult<&[BerNode]> {
    match find_field(fields, FIELD_CONTENTS) {
        Some(node) => Ok(node.as_constructed()?),
        None => Ok(&[]),
    }
}

fn decode_nested_children(fields: &[BerNode], path: &Path) -> GlowResult<Vec<GlowElement>> {
    match find_field(fields, FIELD_CHILDREN) {
        Some(node) => node
            .as_constructed()?
            .iter()
            .map(|c| decode_element(c, Some(path)))
            .collect(),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Access, ParameterType};

    #[test]
    fn node_round_trip_qualified() {
        let element = GlowElement::Node {
            path: Path::parse("1.2").unwrap(),
            contents: Node {
                identifier: Some("sys".to_string()),
                description: Some("System".to_string()),
                is_online: Some(true),
            },
            children: Vec::new(),
        };
        let encoded = encode_qualified(&element).unwrap();
        let decoded = decode_element(&encoded, None).unwrap();
        assert_eq!(decoded, element);
    }

    #[test]
    fn parameter_round_trip_with_value_and_metadata() {
        let element = GlowElement::Parameter {
            path: Path::parse("1.2").unwrap(),
            contents: Parameter {
                identifier: Some("gain".to_string()),
                value: Some(GlowValue::Real(-6.0)),
                access: Some(Access::ReadWrite),
                param_type: Some(ParameterType::Real),
                minimum: Some(GlowValue::Real(-96.0)),
                maximum: Some(GlowValue::Real(10.0)),
                ..Default::default()
            },
            children: Vec::new(),
        };
        let encoded = encode_qualified(&element).unwrap();
        let decoded = decode_element(&encoded, None).unwrap();
        assert_eq!(decoded, element);
    }

    #[test]
    fn nested_non_qualified_children_resolve_absolute_paths() {
        let root = GlowElement::Node {
            path: Path::root(1),
            contents: Node { identifier: Some("device".to_string()), description: None, is_online: None },
            children: vec![GlowElement::Parameter {
                path: Path::parse("1.2").unwrap(),
                contents: Parameter { identifier: Some("gain".to_string()), ..Default::default() },
                children: Vec::new(),
            }],
        };

        // Re-encode using the non-qualified, number-only address form to
        // exercise parent-relative resolution.
        let encoded_children = match &root {
            GlowElement::Node { children, .. } => children
                .iter()
                .map(|c| match c {
                    GlowElement::Parameter { contents, .. } => {
                        encode_wrapper(glow_type::PARAMETER, field_int(FIELD_ADDRESS, 2), encode_parameter_contents(contents), Vec::new())
                    }
                    _ => unreachable!(),
                })
                .collect(),
            _ => unreachable!(),
        };
        let root_node = encode_wrapper(
            glow_type::NODE,
            field_int(FIELD_ADDRESS, 1),
            encode_node_contents(&Node { identifier: Some("device".to_string()), description: None, is_online: None }),
            encoded_children,
        );

        let decoded = decode_element(&root_node, None).unwrap();
        match decoded {
            GlowElement::Node { path, children, .. } => {
                assert_eq!(path, Path::root(1));
                assert_eq!(children[0].path().unwrap(), &Path::parse("1.2").unwrap());
            }
            _ => panic!("expected node"),
        }
    }

    #[test]
    fn root_collection_round_trip() {
        let elements = vec![
            GlowElement::Node {
                path: Path::root(1),
                contents: Node { identifier: Some("device".to_string()), description: None, is_online: None },
                children: Vec::new(),
            },
            GlowElement::Parameter {
                path: Path::parse("1.2").unwrap(),
                contents: Parameter { identifier: Some("gain".to_string()), ..Default::default() },
                children: Vec::new(),
            },
        ];
        let encoded = encode_root(&elements).unwrap();
        let decoded = decode_root(&encoded).unwrap();
        assert_eq!(decoded, elements);
    }

    #[test]
    fn command_get_directory_round_trip() {
        use crate::tags::command_type;
        let element = GlowElement::Command {
            path: Path::parse("1.2").unwrap(),
            command: Command { number: command_type::GET_DIRECTORY, invocation: None, dir_field_mask: None },
        };
        let encoded = encode_qualified(&element).unwrap();
        let decoded = decode_command(&encoded).unwrap();
        match &element {
            GlowElement::Command { command, .. } => assert_eq!(&decoded, command),
            _ => unreachable!(),
        }
    }
}
