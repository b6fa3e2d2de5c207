//! Consumer-side Ember+ protocol engine.
//!
//! [`Consumer::connect`] opens a session and hands back a handle plus an
//! event stream; the session itself runs on its own task (see [`engine`])
//! driven by `Command`s and emitting `Event`s, with lazy tree expansion,
//! subscriptions, writes, invocations, matrix operations, and complete-tree
//! snapshot capture layered on top of the raw Glow/S101/BER stack.

mod command;
mod consumer;
mod engine;
mod error;
mod event;
mod invocations;
mod metadata;
mod protocol;
mod state;
mod streams;
mod subscriptions;
mod tree_fetch;

pub use consumer::Consumer;
pub use error::{ConsumerError, ConsumerResult};
pub use event::{
    Event, InvocationResultEvent, MatrixConnectionInfo, MatrixInfo, NodeInfo, ParameterInfo, StreamValue,
};
pub use state::ConnectionState;
pub use tree_fetch::MAX_PARALLEL as MAX_PARALLEL_FETCH;
