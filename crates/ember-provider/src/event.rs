use std::net::SocketAddr;

use ember_glow::Path;

/// The kind of request a session just received, reported alongside
/// [`ProviderEvent::RequestReceived`] purely for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Directory,
    Subscribe,
    Unsubscribe,
    Write,
    Invoke,
    MatrixConnect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    ClientConnected(SocketAddr),
    ClientDisconnected(SocketAddr),
    RequestReceived { path: Path, kind: RequestKind },
    Error(String),
}
