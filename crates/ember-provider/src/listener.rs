//! The accept loop: binds one port and hands every incoming connection off
//! to its own [`Session`] task.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::warn;

use crate::event::ProviderEvent;
use crate::session::Session;
use crate::shared::Shared;

pub(crate) struct Listener {
    listen_stream: TcpListener,
    shared: Arc<Shared>,
    events: mpsc::Sender<ProviderEvent>,
    idle_timeout: Option<Duration>,
}

impl Listener {
    pub(crate) async fn bind(
        bind_address: &str,
        port: u16,
        shared: Arc<Shared>,
        events: mpsc::Sender<ProviderEvent>,
        idle_timeout: Option<Duration>,
    ) -> std::io::Result<Self> {
        let listen_stream = TcpListener::bind((bind_address, port)).await?;
        Ok(Listener { listen_stream, shared, events, idle_timeout })
    }

    pub(crate) fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listen_stream.local_addr()
    }

    /// Accept connections until the event channel's receiver is dropped.
    pub(crate) async fn run(self) {
        loop {
            match self.listen_stream.accept().await {
                Ok((stream, addr)) => {
                    Session::spawn(stream, addr, Arc::clone(&self.shared), self.events.clone(), self.idle_timeout);
                }
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    if self.events.send(ProviderEvent::Error(err.to_string())).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
