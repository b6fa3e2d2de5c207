use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ember_model::DeviceStore;
use ember_snapshot::Snapshot;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::ProviderResult;
use crate::event::ProviderEvent;
use crate::listener::Listener;
use crate::shared::Shared;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default provider listener port (the emulator/provider convention; not
/// the consumer's default of 9092).
pub const DEFAULT_PORT: u16 = 9099;

/// Host-facing handle to one provider: a loaded device tree plus (once
/// started) a listener accepting any number of concurrent consumer
/// sessions against that same tree.
pub struct Provider {
    shared: Arc<Shared>,
    listener: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
    idle_timeout: Option<Duration>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        Provider { shared: Arc::new(Shared::new(DeviceStore::new())), listener: None, local_addr: None, idle_timeout: None }
    }

    /// Disconnect any session that sends nothing at all (no request, no
    /// keep-alive) within `timeout`. `None` (the default) never times out.
    pub fn set_idle_timeout(&mut self, timeout: Option<Duration>) {
        self.idle_timeout = timeout;
    }

    /// Replace the served device tree with `snapshot`'s contents.
    pub fn load(&self, snapshot: &Snapshot) -> ProviderResult<()> {
        let store = ember_snapshot::to_store(snapshot)?;
        self.shared.with_store(|current| *current = store);
        Ok(())
    }

    /// Bind `port` on all interfaces and start accepting sessions. Calling
    /// this (or [`Provider::start_listening_on`]) again while already
    /// listening replaces the previous listener.
    pub async fn start_listening(&mut self, port: u16) -> ProviderResult<mpsc::Receiver<ProviderEvent>> {
        self.start_listening_on("0.0.0.0", port).await
    }

    /// Bind `port` on `bind_address` and start accepting sessions, returning
    /// the event stream.
    pub async fn start_listening_on(&mut self, bind_address: &str, port: u16) -> ProviderResult<mpsc::Receiver<ProviderEvent>> {
        self.stop_listening();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let listener = Listener::bind(bind_address, port, Arc::clone(&self.shared), events_tx, self.idle_timeout).await?;
        let bound = listener.local_addr()?;
        info!(bind_address, port = bound.port(), "provider listening");
        self.local_addr = Some(bound);
        self.listener = Some(tokio::spawn(listener.run()));
        Ok(events_rx)
    }

    pub fn stop_listening(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
        self.local_addr = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// The address actually bound by `start_listening`, e.g. to read back
    /// the OS-assigned port after binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_glow::{command_type, Command, GlowElement, Node};
    use ember_s101::{S101Decoder, S101Event};
    use ember_snapshot::{NodeJson, ParameterJson, Snapshot};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn get_directory_request(path: ember_glow::Path) -> GlowElement {
        GlowElement::Node {
            path: path.clone(),
            contents: Node::default(),
            children: vec![GlowElement::Command {
                path,
                command: Command { number: command_type::GET_DIRECTORY, invocation: None, dir_field_mask: None },
            }],
        }
    }

    fn one_device_snapshot() -> Snapshot {
        Snapshot {
            format_version: ember_snapshot::CURRENT_FORMAT_VERSION,
            device_name: "test device".to_string(),
            capture_time: "2026-01-01T00:00:00Z".to_string(),
            host_address: "127.0.0.1".to_string(),
            port: 9099,
            root_paths: vec!["1".to_string()],
            nodes: vec![NodeJson {
                path: "1".to_string(),
                identifier: Some("device".to_string()),
                children: vec!["1.1".to_string()],
                ..Default::default()
            }],
            parameters: vec![ParameterJson {
                path: "1.1".to_string(),
                identifier: Some("gain".to_string()),
                param_type: Some(2),
                access: Some(3),
                is_online: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    async fn read_one_ember(stream: &mut TcpStream) -> Vec<u8> {
        let mut decoder = S101Decoder::new();
        let mut buf = vec![0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.expect("read");
            assert!(n > 0, "connection closed before a full Ember message arrived");
            for event in decoder.feed(&buf[..n]) {
                if let Ok(S101Event::Ember(bytes)) = event {
                    return bytes;
                }
            }
        }
    }

    #[tokio::test]
    async fn root_get_directory_returns_the_device_node() {
        let mut provider = Provider::new();
        provider.load(&one_device_snapshot()).unwrap();
        let _events = provider.start_listening(0).await.unwrap();
        let addr = provider.local_addr().unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = ember_glow::encode_root(&[get_directory_request(ember_glow::Path::from_numbers(Vec::new()))]).unwrap();
        stream.write_all(&ember_s101::encode_ember(&request.encode())).await.unwrap();

        let reply_bytes = read_one_ember(&mut stream).await;
        let node = ember_ber::decode_one(&reply_bytes).unwrap();
        let elements = ember_glow::decode_root(&node).unwrap();
        assert_eq!(elements.len(), 1);
        match &elements[0] {
            GlowElement::Node { path, contents, .. } => {
                assert_eq!(path, &ember_glow::Path::root(1));
                assert_eq!(contents.identifier.as_deref(), Some("device"));
            }
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn writing_a_parameter_echoes_the_update() {
        let mut provider = Provider::new();
        provider.load(&one_device_snapshot()).unwrap();
        let _events = provider.start_listening(0).await.unwrap();
        let addr = provider.local_addr().unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let write = GlowElement::Parameter {
            path: ember_glow::Path::parse("1.1").unwrap(),
            contents: ember_glow::Parameter { value: Some(ember_glow::GlowValue::Real(-6.0)), ..Default::default() },
            children: Vec::new(),
        };
        let request = ember_glow::encode_root(&[write]).unwrap();
        stream.write_all(&ember_s101::encode_ember(&request.encode())).await.unwrap();

        let reply_bytes = read_one_ember(&mut stream).await;
        let node = ember_ber::decode_one(&reply_bytes).unwrap();
        let elements = ember_glow::decode_root(&node).unwrap();
        match &elements[0] {
            GlowElement::Parameter { contents, .. } => {
                assert_eq!(contents.value, Some(ember_glow::GlowValue::Real(-6.0)));
                assert_eq!(contents.identifier.as_deref(), Some("gain"));
            }
            other => panic!("expected a parameter, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn idle_session_is_disconnected_after_the_configured_timeout() {
        let mut provider = Provider::new();
        provider.load(&one_device_snapshot()).unwrap();
        provider.set_idle_timeout(Some(std::time::Duration::from_millis(50)));
        let mut events = provider.start_listening(0).await.unwrap();
        let addr = provider.local_addr().unwrap();

        let stream = TcpStream::connect(addr).await.unwrap();
        let connected = events.recv().await.unwrap();
        assert!(matches!(connected, crate::ProviderEvent::ClientConnected(_)));

        let disconnected = events.recv().await.unwrap();
        assert!(matches!(disconnected, crate::ProviderEvent::ClientDisconnected(_)));
        drop(stream);
    }
}
