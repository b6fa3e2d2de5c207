//! The JSON shape of a snapshot file, independent of the live device store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum JsonValue {
    Integer(i64),
    Real(f64),
    String(String),
    Boolean(bool),
    Trigger,
    Enum(i32),
    Octets(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub nodes: usize,
    pub parameters: usize,
    pub matrices: usize,
    pub functions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeJson {
    pub path: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub is_online: Option<bool>,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterJson {
    pub path: String,
    pub identifier: Option<String>,
    pub value: Option<JsonValue>,
    #[serde(rename = "type")]
    pub param_type: Option<i32>,
    pub access: Option<i32>,
    pub is_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_identifier: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionJson {
    pub target: i32,
    pub source: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixJson {
    pub path: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub matrix_type: Option<i32>,
    pub target_count: Option<i32>,
    pub source_count: Option<i32>,
    pub target_numbers: Vec<i32>,
    pub source_numbers: Vec<i32>,
    pub target_labels: BTreeMap<String, String>,
    pub source_labels: BTreeMap<String, String>,
    pub connections: Vec<ConnectionJson>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionJson {
    pub path: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub arg_names: Vec<String>,
    pub arg_types: Vec<i32>,
    pub result_names: Vec<String>,
    pub result_types: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub format_version: i32,
    pub device_name: String,
    pub capture_time: String,
    pub host_address: String,
    pub port: u16,
    pub statistics: Statistics,
    pub root_paths: Vec<String>,
    pub nodes: Vec<NodeJson>,
    pub parameters: Vec<ParameterJson>,
    pub matrices: Vec<MatrixJson>,
    pub functions: Vec<FunctionJson>,
}

pub const CURRENT_FORMAT_VERSION: i32 = 1;
