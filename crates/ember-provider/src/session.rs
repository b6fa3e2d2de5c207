//! One connected consumer's session: its own S101 decoder, its own
//! subscription bookkeeping (held centrally in [`Shared`] so a mutation on
//! any session can find every interested peer), request dispatch per
//! spec section 4.5, and the write side fed both by direct replies and by
//! broadcasts from other sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ember_glow::{
    command_type, matrix_operation, Command, Connection, GlowElement, GlowValue, InvocationResult,
    Matrix, Parameter, Path,
};
use ember_model::StoredElement;
use ember_s101::{S101Decoder, S101Event};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::{ProviderEvent, RequestKind};
use crate::response;
use crate::shared::Shared;

const OUTBOX_CAPACITY: usize = 64;
const READ_BUFFER: usize = 8192;

pub(crate) struct Session {
    id: u64,
    addr: SocketAddr,
    stream: TcpStream,
    decoder: S101Decoder,
    shared: Arc<Shared>,
    outbox_rx: mpsc::Receiver<GlowElement>,
    events: mpsc::Sender<ProviderEvent>,
    idle_timeout: Option<Duration>,
}

impl Session {
    pub(crate) fn spawn(
        stream: TcpStream,
        addr: SocketAddr,
        shared: Arc<Shared>,
        events: mpsc::Sender<ProviderEvent>,
        idle_timeout: Option<Duration>,
    ) {
        let (outbox_tx, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
        let id = shared.register(outbox_tx);
        let session = Session { id, addr, stream, decoder: S101Decoder::new(), shared, outbox_rx, events, idle_timeout };
        tokio::spawn(session.run());
    }

    async fn run(mut self) {
        let _ = self.events.send(ProviderEvent::ClientConnected(self.addr)).await;
        let mut buf = vec![0u8; READ_BUFFER];
        loop {
            tokio::select! {
                biased;
                broadcasted = self.outbox_rx.recv() => {
                    match broadcasted {
                        Some(element) => {
                            if self.send_elements(vec![element]).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                read = read_with_optional_timeout(&mut self.stream, &mut buf, self.idle_timeout) => {
                    match read {
                        Some(Ok(0)) => break,
                        Some(Ok(n)) => {
                            if self.handle_incoming(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(_)) => break,
                        None => {
                            debug!(peer = %self.addr, "session idle timeout, disconnecting");
                            break;
                        }
                    }
                }
            }
        }
        self.shared.unregister(self.id);
        let _ = self.events.send(ProviderEvent::ClientDisconnected(self.addr)).await;
    }

    async fn send_elements(&mut self, elements: Vec<GlowElement>) -> std::io::Result<()> {
        if elements.is_empty() {
            return Ok(());
        }
        let node = ember_glow::encode_root(&elements).map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        let frame = ember_s101::encode_ember(&node.encode());
        self.stream.write_all(&frame).await
    }

    async fn handle_incoming(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        for event in self.decoder.feed(bytes) {
            match event {
                Ok(S101Event::Ember(ber_bytes)) => self.handle_ember(&ber_bytes).await?,
                Ok(S101Event::KeepAliveRequest) => {
                    self.stream.write_all(&ember_s101::encode_keepalive_response()).await?;
                }
                Ok(S101Event::KeepAliveResponse) => {}
                Err(err) => {
                    debug!(error = %err, "framing error, dropping frame and resyncing");
                    let _ = self.events.send(ProviderEvent::Error(err.to_string())).await;
                }
            }
        }
        Ok(())
    }

    async fn handle_ember(&mut self, ber_bytes: &[u8]) -> std::io::Result<()> {
        let node = match ember_ber::decode_one(ber_bytes) {
            Ok(node) => node,
            Err(err) => {
                let _ = self.events.send(ProviderEvent::Error(err.to_string())).await;
                return Ok(());
            }
        };
        let elements = match ember_glow::decode_root(&node) {
            Ok(elements) => elements,
            Err(err) => {
                let _ = self.events.send(ProviderEvent::Error(err.to_string())).await;
                return Ok(());
            }
        };
        for element in &elements {
            self.dispatch(element).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, element: &GlowElement) -> std::io::Result<()> {
        match element {
            GlowElement::Command { path, command } => self.handle_command(path.clone(), command).await,
            GlowElement::Node { path, children, .. } => {
                if let Some(command) = find_command(children) {
                    self.handle_command(path.clone(), command).await?;
                }
                Ok(())
            }
            GlowElement::Parameter { path, contents, children } => {
                if let Some(command) = find_command(children) {
                    self.handle_command(path.clone(), command).await
                } else if let Some(value) = &contents.value {
                    self.handle_write(path, value.clone()).await
                } else {
                    Ok(())
                }
            }
            GlowElement::Matrix { path, contents, .. } => {
                if let Some(connections) = &contents.connections {
                    self.handle_matrix(path, connections).await
                } else {
                    Ok(())
                }
            }
            GlowElement::Function { path, children, .. } => {
                if let Some(command) = find_command(children) {
                    if command.number == command_type::INVOKE {
                        return self.handle_invoke(path, command).await;
                    }
                }
                Ok(())
            }
            GlowElement::InvocationResult(_) => Ok(()),
            GlowElement::StreamCollection(_) => Ok(()),
        }
    }

    async fn handle_command(&mut self, path: Path, command: &Command) -> std::io::Result<()> {
        match command.number {
            n if n == command_type::GET_DIRECTORY => {
                self.emit(RequestKind::Directory, &path).await;
                let response = self.shared.with_store(|store| {
                    if path.is_empty() {
                        response::root_directory_response(store)
                    } else {
                        response::node_directory_response(store, &path)
                    }
                });
                self.send_elements(response).await
            }
            n if n == command_type::SUBSCRIBE => {
                self.emit(RequestKind::Subscribe, &path).await;
                self.shared.subscribe(self.id, path);
                Ok(())
            }
            n if n == command_type::UNSUBSCRIBE => {
                self.emit(RequestKind::Unsubscribe, &path).await;
                self.shared.unsubscribe(self.id, &path);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn handle_write(&mut self, path: &Path, value: GlowValue) -> std::io::Result<()> {
        self.emit(RequestKind::Write, path).await;
        let outcome = self.shared.with_store(|store| {
            let writable = matches!(
                store.get(path),
                Some(StoredElement::Parameter(param)) if param.is_editable()
            );
            if !writable {
                return None;
            }
            let update = Parameter { value: Some(value), ..Default::default() };
            store.put_parameter(path, &update).ok()?;
            store.get(path).map(|stored| response::element_summary(path, stored))
        });
        if let Some(summary) = outcome {
            self.send_elements(vec![summary.clone()]).await?;
            self.shared.broadcast(self.id, path, &summary);
        }
        Ok(())
    }

    async fn handle_matrix(&mut self, path: &Path, connections: &[Connection]) -> std::io::Result<()> {
        self.emit(RequestKind::MatrixConnect, path).await;
        let mut applied = Vec::new();
        self.shared.with_store(|store| {
            let Some(matrix) = store.matrix_mut(path) else { return };
            for connection in connections {
                let operation = connection.operation.unwrap_or(matrix_operation::ABSOLUTE);
                if let Ok(disposition) = ember_model::apply_connection(matrix, connection.target, &connection.sources, operation) {
                    let sources = matrix.connections.get(&connection.target).cloned().unwrap_or_default();
                    applied.push(Connection {
                        target: connection.target,
                        sources: sources.iter().map(|c| c.source).collect(),
                        operation: None,
                        disposition: Some(disposition),
                    });
                }
            }
        });
        if applied.is_empty() {
            return Ok(());
        }
        let response = GlowElement::Matrix {
            path: path.clone(),
            contents: Matrix { connections: Some(applied), ..Default::default() },
            children: Vec::new(),
        };
        self.send_elements(vec![response.clone()]).await?;
        self.shared.broadcast(self.id, path, &response);
        Ok(())
    }

    async fn handle_invoke(&mut self, path: &Path, command: &Command) -> std::io::Result<()> {
        self.emit(RequestKind::Invoke, path).await;
        let Some(invocation) = &command.invocation else { return Ok(()) };
        let is_function = self.shared.with_store(|store| matches!(store.get(path), Some(StoredElement::Function(_))));
        if !is_function {
            return Ok(());
        }
        let result = GlowElement::InvocationResult(InvocationResult {
            invocation_id: invocation.id,
            success: Some(true),
            result: None,
        });
        self.send_elements(vec![result]).await
    }

    async fn emit(&mut self, kind: RequestKind, path: &Path) {
        let _ = self.events.send(ProviderEvent::RequestReceived { path: path.clone(), kind }).await;
    }
}

/// Reads from `stream`, bounded by `timeout` if one is configured. Returns
/// `None` on timeout (the caller treats this as an idle disconnect), never
/// on a plain read — callers can't distinguish a slow peer from one that
/// truly has nothing to say, so the timeout is the only signal.
async fn read_with_optional_timeout(stream: &mut TcpStream, buf: &mut [u8], timeout: Option<Duration>) -> Option<std::io::Result<usize>> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, stream.read(buf)).await.ok(),
        None => Some(stream.read(buf).await),
    }
}

fn find_command(children: &[GlowElement]) -> Option<&Command> {
    children.iter().find_map(|child| match child {
        GlowElement::Command { command, .. } => Some(command),
        _ => None,
    })
}
