//! Snapshot JSON codec for a device tree, and the process-wide
//! device-identity cache consumers use to remember a device across sessions.

mod cache;
mod codec;
mod error;
mod model;

pub use cache::{lookup as cache_lookup, record as cache_record, CacheEntry};
pub use codec::{from_store, load_json, save_json, to_store};
pub use error::{SnapshotError, SnapshotResult};
pub use model::{
    ConnectionJson, FunctionJson, JsonValue, MatrixJson, NodeJson, ParameterJson, Snapshot,
    Statistics, CURRENT_FORMAT_VERSION,
};
