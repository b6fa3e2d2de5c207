use ember_glow::{GlowValue, Path};
use tokio::sync::oneshot;

/// A host-issued intent, rendered by the engine task as one Glow message
/// (or a small batch) and pushed through the encoders in FIFO order.
#[derive(Debug)]
pub enum Command {
    Disconnect,
    Expand(Path),
    Collapse(Path),
    Subscribe(Path),
    Unsubscribe(Path),
    Write(Path, GlowValue),
    Invoke(Path, Vec<GlowValue>, oneshot::Sender<i32>),
    SetMatrixConnection { path: Path, target: i32, source: i32, connect: bool },
    RequestMatrixConnections(Path),
    FetchCompleteTree(Vec<Path>),
}
