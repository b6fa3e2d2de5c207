use ember_glow::{GlowValue, Path};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::command::Command;
use crate::error::{ConsumerError, ConsumerResult};
use crate::engine::Engine;
use crate::event::Event;

const EVENT_CHANNEL_CAPACITY: usize = 256;
const COMMAND_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Host-facing handle to one consumer session. Cloning shares the same
/// underlying engine task; dropping every clone (or calling `disconnect`)
/// tears the session down.
#[derive(Clone)]
pub struct Consumer {
    commands: mpsc::Sender<Command>,
}

impl Consumer {
    /// Connect to `host:port`, spawn the engine task, and return the handle
    /// together with the event stream it feeds. The engine issues a
    /// root-level `GetDirectory` as soon as the socket is up.
    pub async fn connect(host: &str, port: u16) -> ConsumerResult<(Consumer, mpsc::Receiver<Event>)> {
        let stream = tokio::time::timeout(DEFAULT_CONNECT_TIMEOUT, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConsumerError::ConnectTimeout)??;
        info!(host, port, "consumer connected");

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let engine = Engine::new(stream, event_tx, command_rx);
        tokio::spawn(engine.run());

        Ok((Consumer { commands: command_tx }, event_rx))
    }

    pub async fn disconnect(&self) -> ConsumerResult<()> {
        self.send(Command::Disconnect).await
    }

    pub async fn expand(&self, path: Path) -> ConsumerResult<()> {
        self.send(Command::Expand(path)).await
    }

    pub async fn collapse(&self, path: Path) -> ConsumerResult<()> {
        self.send(Command::Collapse(path)).await
    }

    pub async fn subscribe(&self, path: Path) -> ConsumerResult<()> {
        self.send(Command::Subscribe(path)).await
    }

    pub async fn unsubscribe(&self, path: Path) -> ConsumerResult<()> {
        self.send(Command::Unsubscribe(path)).await
    }

    pub async fn write(&self, path: Path, value: GlowValue) -> ConsumerResult<()> {
        self.send(Command::Write(path, value)).await
    }

    /// Send an invocation and return the id assigned to it; the matching
    /// result arrives later as `Event::InvocationResult`.
    pub async fn invoke(&self, path: Path, arguments: Vec<GlowValue>) -> ConsumerResult<i32> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Invoke(path, arguments, reply_tx))
            .await
            .map_err(|_| ConsumerError::EngineGone)?;
        reply_rx.await.map_err(|_| ConsumerError::EngineGone)
    }

    pub async fn set_matrix_connection(&self, path: Path, target: i32, source: i32, connect: bool) -> ConsumerResult<()> {
        self.send(Command::SetMatrixConnection { path, target, source, connect }).await
    }

    pub async fn request_matrix_connections(&self, path: Path) -> ConsumerResult<()> {
        self.send(Command::RequestMatrixConnections(path)).await
    }

    pub async fn fetch_complete_tree(&self, initial_paths: Vec<Path>) -> ConsumerResult<()> {
        self.send(Command::FetchCompleteTree(initial_paths)).await
    }

    async fn send(&self, command: Command) -> ConsumerResult<()> {
        self.commands.send(command).await.map_err(|_| ConsumerError::EngineGone)
    }
}
