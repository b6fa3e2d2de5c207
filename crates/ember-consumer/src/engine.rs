use std::collections::{HashMap, HashSet};

use ember_glow::{matrix_operation, parse_label_path, GlowElement, GlowValue, Path};
use ember_model::DeviceStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::Command;
use crate::event::{Event, InvocationResultEvent, MatrixConnectionInfo, MatrixInfo, NodeInfo, ParameterInfo, StreamValue};
use crate::invocations::InvocationTracker;
use crate::metadata::ParameterMetadataCache;
use crate::protocol;
use crate::streams::StreamFactorCache;
use crate::subscriptions::SubscriptionTracker;
use crate::tree_fetch::TreeFetcher;

/// Owns one consumer connection end to end: the socket, the decoder, the
/// device model, and every piece of session bookkeeping a connected host
/// relies on. Lives entirely inside its own task; the host only ever talks
/// to it through the `Command`/`Event` channels.
pub(crate) struct Engine {
    stream: TcpStream,
    decoder: ember_s101::S101Decoder,
    store: DeviceStore,
    metadata: ParameterMetadataCache,
    subscriptions: SubscriptionTracker,
    invocations: InvocationTracker,
    streams: StreamFactorCache,
    fetched: HashSet<Path>,
    auto_subscribe_containers: HashSet<Path>,
    tree_fetch: Option<TreeFetcher>,
    events: mpsc::Sender<Event>,
    commands: mpsc::Receiver<Command>,
}

impl Engine {
    pub(crate) fn new(stream: TcpStream, events: mpsc::Sender<Event>, commands: mpsc::Receiver<Command>) -> Self {
        Engine {
            stream,
            decoder: ember_s101::S101Decoder::new(),
            store: DeviceStore::new(),
            metadata: ParameterMetadataCache::new(),
            subscriptions: SubscriptionTracker::new(),
            invocations: InvocationTracker::new(),
            streams: StreamFactorCache::new(),
            fetched: HashSet::new(),
            auto_subscribe_containers: HashSet::new(),
            tree_fetch: None,
            events,
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        let root = Path::from_numbers(Vec::new());
        self.fetched.insert(root.clone());
        if let Err(err) = self.send_elements(vec![protocol::get_directory(&root)]).await {
            let _ = self.events.send(Event::Disconnected(err.to_string())).await;
            return;
        }
        if self.events.send(Event::Connected).await.is_err() {
            return;
        }

        let mut buf = [0u8; 4096];
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Disconnect) | None => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }
                read = self.stream.read(&mut buf) => {
                    match read {
                        Ok(0) => {
                            let _ = self.events.send(Event::Disconnected("connection closed by peer".to_string())).await;
                            break;
                        }
                        Ok(n) => self.handle_incoming(&buf[..n]).await,
                        Err(err) => {
                            let _ = self.events.send(Event::Disconnected(err.to_string())).await;
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn send_elements(&mut self, elements: Vec<GlowElement>) -> std::io::Result<()> {
        let node = ember_glow::encode_root(&elements)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        let bytes = ember_s101::encode_ember(&node.encode());
        self.stream.write_all(&bytes).await
    }

    async fn handle_command(&mut self, command: Command) {
        let result = match command {
            Command::Disconnect => Ok(()),
            Command::Expand(path) => self.handle_expand(path).await,
            Command::Collapse(path) => self.handle_collapse(path).await,
            Command::Subscribe(path) => {
                self.subscriptions.subscribe(path.clone(), false);
                self.send_elements(vec![protocol::subscribe(&path)]).await
            }
            Command::Unsubscribe(path) => {
                self.subscriptions.unsubscribe(&path);
                self.send_elements(vec![protocol::unsubscribe(&path)]).await
            }
            Command::Write(path, value) => self.send_elements(vec![protocol::write_parameter(&path, value)]).await,
            Command::Invoke(path, arguments, reply) => {
                let id = self.invocations.begin(path.clone());
                let outcome = self.send_elements(vec![protocol::invoke(&path, id, arguments)]).await;
                let _ = reply.send(id);
                outcome
            }
            Command::SetMatrixConnection { path, target, source, connect } => {
                self.send_elements(vec![protocol::matrix_connection(&path, target, source, connect)]).await
            }
            Command::RequestMatrixConnections(path) => self.send_elements(vec![protocol::get_directory(&path)]).await,
            Command::FetchCompleteTree(initial) => self.handle_fetch_complete_tree(initial).await,
        };
        if let Err(err) = result {
            warn!(error = %err, "failed to send consumer request");
        }
    }

    /// Request `path` plus every not-yet-fetched sibling in one batched root.
    async fn handle_expand(&mut self, path: Path) -> std::io::Result<()> {
        if self.fetched.contains(&path) {
            return Ok(());
        }
        self.auto_subscribe_containers.insert(path.clone());
        self.subscriptions.subscribe(path.clone(), true);

        let mut requests = vec![path.clone()];
        self.fetched.insert(path.clone());
        if let Some(parent) = path.parent() {
            for sibling in self.store.children(&parent).to_vec() {
                if sibling != path && self.fetched.insert(sibling.clone()) {
                    requests.push(sibling);
                }
            }
        }

        let elements = requests.iter().map(protocol::get_directory).collect();
        self.send_elements(elements).await
    }

    async fn handle_collapse(&mut self, path: Path) -> std::io::Result<()> {
        self.auto_subscribe_containers.remove(&path);
        let children = self.store.children(&path).to_vec();
        let removed = self.subscriptions.collapse(&path, &children);
        if removed.is_empty() {
            return Ok(());
        }
        let elements = removed.iter().map(protocol::unsubscribe).collect();
        self.send_elements(elements).await
    }

    async fn handle_fetch_complete_tree(&mut self, initial: Vec<Path>) -> std::io::Result<()> {
        for path in &initial {
            self.fetched.insert(path.clone());
        }
        let mut fetcher = TreeFetcher::new(initial);
        let batch = fetcher.next_batch();
        self.tree_fetch = Some(fetcher);
        if batch.is_empty() {
            self.tree_fetch = None;
            let _ = self.events.send(Event::TreeFetchComplete).await;
            return Ok(());
        }
        let elements = batch.iter().map(protocol::get_directory).collect();
        self.send_elements(elements).await
    }

    async fn handle_incoming(&mut self, bytes: &[u8]) {
        for result in self.decoder.feed(bytes) {
            match result {
                Ok(ember_s101::S101Event::Ember(ber_bytes)) => self.handle_ember(&ber_bytes).await,
                Ok(ember_s101::S101Event::KeepAliveRequest) => {
                    let response = ember_s101::encode_keepalive_response();
                    if let Err(err) = self.stream.write_all(&response).await {
                        let _ = self.events.send(Event::Disconnected(err.to_string())).await;
                    }
                }
                Ok(ember_s101::S101Event::KeepAliveResponse) => {}
                Err(err) => {
                    let _ = self.events.send(Event::DecodeError(err.to_string())).await;
                }
            }
        }
    }

    async fn handle_ember(&mut self, ber_bytes: &[u8]) {
        let node = match ember_ber::decode_one(ber_bytes) {
            Ok(node) => node,
            Err(err) => {
                let _ = self.events.send(Event::DecodeError(err.to_string())).await;
                return;
            }
        };
        let elements = match ember_glow::decode_root(&node) {
            Ok(elements) => elements,
            Err(err) => {
                let _ = self.events.send(Event::DecodeError(err.to_string())).await;
                return;
            }
        };
        if let Some(fetcher) = &mut self.tree_fetch {
            feed_tree_fetch(fetcher, &elements);
        }
        for element in &elements {
            if let Err(err) = self.store.ingest(element) {
                debug!(error = %err, "ignoring element that violated a model invariant");
                let _ = self.events.send(Event::DecodeError(err.to_string())).await;
                continue;
            }
            let mut events = Vec::new();
            let mut auto_subscribe = Vec::new();
            self.collect(element, &mut events, &mut auto_subscribe);
            for event in events {
                if self.events.send(event).await.is_err() {
                    return;
                }
            }
            if !auto_subscribe.is_empty() {
                let requests = auto_subscribe.iter().map(protocol::subscribe).collect();
                if let Err(err) = self.send_elements(requests).await {
                    warn!(error = %err, "failed to send auto-subscribe request");
                }
            }
        }
        self.advance_tree_fetch().await;
    }

    /// Recursively turn one decoded element into host-facing events, updating
    /// session-only bookkeeping (metadata cache, stream factors, invocation
    /// correlation) along the way. `auto_subscribe` collects newly discovered
    /// children of an expanding container that still need a Subscribe sent.
    fn collect(&mut self, element: &GlowElement, events: &mut Vec<Event>, auto_subscribe: &mut Vec<Path>) {
        match element {
            GlowElement::Node { path, contents, children } => {
                self.note_auto_subscribe(path, auto_subscribe);
                events.push(Event::Node(NodeInfo {
                    path: path.clone(),
                    identifier: contents.identifier.clone(),
                    description: contents.description.clone(),
                    is_online: contents.is_online,
                }));
                for child in children {
                    self.collect(child, events, auto_subscribe);
                }
            }
            GlowElement::Parameter { path, contents, children } => {
                if let Some((matrix_path, is_target, number)) = parse_label_path(path) {
                    let label = match &contents.value {
                        Some(GlowValue::String(s)) => Some(s.clone()),
                        _ => None,
                    };
                    events.push(if is_target {
                        Event::MatrixTarget { path: matrix_path, number, label }
                    } else {
                        Event::MatrixSource { path: matrix_path, number, label }
                    });
                } else {
                    self.note_auto_subscribe(path, auto_subscribe);
                    if let Some(stream_id) = contents.stream_identifier {
                        if let Some(factor) = contents.factor {
                            self.streams.record_factor(stream_id, factor);
                        }
                    }
                    self.metadata.record(path, contents);
                    let mut filled = contents.clone();
                    self.metadata.fill(path, &mut filled);
                    events.push(Event::Parameter(ParameterInfo {
                        path: path.clone(),
                        identifier: filled.identifier,
                        value: filled.value,
                        access: filled.access,
                        param_type: filled.param_type,
                        is_online: filled.is_online,
                        minimum: filled.minimum,
                        maximum: filled.maximum,
                        enum_options: filled.enumeration,
                        stream_identifier: filled.stream_identifier,
                    }));
                }
                for child in children {
                    self.collect(child, events, auto_subscribe);
                }
            }
            GlowElement::Matrix { path, contents, children } => {
                self.note_auto_subscribe(path, auto_subscribe);
                events.push(Event::Matrix(MatrixInfo {
                    path: path.clone(),
                    identifier: contents.identifier.clone(),
                    description: contents.description.clone(),
                    matrix_type: contents.matrix_type,
                    target_count: contents.target_count,
                    source_count: contents.source_count,
                }));
                if let Some(connections) = &contents.connections {
                    for connection in connections {
                        let connected = connection.operation != Some(matrix_operation::DISCONNECT);
                        for &source in &connection.sources {
                            events.push(Event::MatrixConnection(MatrixConnectionInfo {
                                path: path.clone(),
                                target: connection.target,
                                source,
                                connected,
                            }));
                        }
                    }
                }
                for child in children {
                    self.collect(child, events, auto_subscribe);
                }
            }
            GlowElement::Function { children, .. } => {
                // No dedicated host event for functions: the store already
                // records them for invoke() to target.
                for child in children {
                    self.collect(child, events, auto_subscribe);
                }
            }
            GlowElement::Command { .. } => {}
            GlowElement::InvocationResult(result) => {
                let path = self.invocations.resolve(result.invocation_id);
                events.push(Event::InvocationResult(InvocationResultEvent {
                    invocation_id: result.invocation_id,
                    path,
                    success: result.success,
                    result: result.result.clone(),
                }));
            }
            GlowElement::StreamCollection(entries) => {
                for entry in entries {
                    let value = self.streams.deliver(entry.stream_identifier, &entry.value);
                    events.push(Event::StreamValue(StreamValue { stream_identifier: entry.stream_identifier, value }));
                }
            }
        }
    }

    fn note_auto_subscribe(&mut self, path: &Path, auto_subscribe: &mut Vec<Path>) {
        let Some(parent) = path.parent() else { return };
        if !self.auto_subscribe_containers.contains(&parent) {
            return;
        }
        if !self.subscriptions.is_subscribed(path) {
            self.subscriptions.subscribe(path.clone(), true);
            auto_subscribe.push(path.clone());
        }
    }

    async fn advance_tree_fetch(&mut self) {
        let Some(fetcher) = &mut self.tree_fetch else { return };
        let (completed, total) = fetcher.progress();
        let _ = self.events.send(Event::TreeFetchProgress { completed, total }).await;

        if fetcher.is_done() {
            self.tree_fetch = None;
            let _ = self.events.send(Event::TreeFetchComplete).await;
            return;
        }

        let batch = fetcher.next_batch();
        if !batch.is_empty() {
            let elements = batch.iter().map(protocol::get_directory).collect();
            if let Err(err) = self.send_elements(elements).await {
                warn!(error = %err, "failed to send complete-tree fetch batch");
            }
        }
    }
}

/// Feed a decoded reply batch into the complete-tree fetcher: group the
/// elements by their shared parent path and report that parent's directory
/// as answered, queuing only the Node-kind children for further expansion
/// (a `GetDirectory` against a Parameter, Matrix, or Function never yields
/// a reply of its own, so those paths must never be queued to begin with).
fn feed_tree_fetch(fetcher: &mut TreeFetcher, elements: &[GlowElement]) {
    let mut by_parent: HashMap<Path, Vec<Path>> = HashMap::new();
    collect_tree_fetch_children(elements, &mut by_parent);
    for (parent, expandable_children) in by_parent {
        fetcher.on_node_received(&parent, &expandable_children);
    }
}

fn collect_tree_fetch_children(elements: &[GlowElement], by_parent: &mut HashMap<Path, Vec<Path>>) {
    for element in elements {
        let Some(path) = element.path() else { continue };
        if let Some(parent) = path.parent() {
            let entry = by_parent.entry(parent).or_default();
            if matches!(element, GlowElement::Node { .. }) {
                entry.push(path.clone());
            }
        }
        if let GlowElement::Node { children, .. } = element {
            collect_tree_fetch_children(children, by_parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use ember_glow::{Node, Parameter};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    async fn read_one_ember(socket: &mut TcpStream) -> Vec<u8> {
        let mut decoder = ember_s101::S101Decoder::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            for result in decoder.feed(&buf[..n]) {
                if let Ok(ember_s101::S101Event::Ember(bytes)) = result {
                    return bytes;
                }
            }
        }
    }

    #[tokio::test]
    async fn connecting_sends_a_root_get_directory_and_emits_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_one_ember(&mut socket).await
        });

        let (_consumer, mut events) = crate::Consumer::connect(&addr.ip().to_string(), addr.port()).await.unwrap();
        assert_eq!(events.recv().await, Some(Event::Connected));

        let request_bytes = server.await.unwrap();
        let node = ember_ber::decode_one(&request_bytes).unwrap();
        let elements = ember_glow::decode_root(&node).unwrap();
        match &elements[0] {
            GlowElement::Node { children, .. } => match &children[0] {
                GlowElement::Command { command, .. } => {
                    assert_eq!(command.number, ember_glow::command_type::GET_DIRECTORY);
                }
                _ => panic!("expected a command child"),
            },
            _ => panic!("expected a node wrapper"),
        }
    }

    #[tokio::test]
    async fn a_node_reply_is_ingested_and_reported_as_an_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_one_ember(&mut socket).await; // initial GetDirectory

            let reply = GlowElement::Node {
                path: Path::root(1),
                contents: Node { identifier: Some("device".to_string()), description: None, is_online: Some(true) },
                children: Vec::new(),
            };
            let node = ember_glow::encode_root(&[reply]).unwrap();
            let bytes = ember_s101::encode_ember(&node.encode());
            socket.write_all(&bytes).await.unwrap();
        });

        let (_consumer, mut events) = crate::Consumer::connect(&addr.ip().to_string(), addr.port()).await.unwrap();
        assert_eq!(events.recv().await, Some(Event::Connected));

        let event = events.recv().await.unwrap();
        match event {
            Event::Node(info) => {
                assert_eq!(info.path, Path::root(1));
                assert_eq!(info.identifier.as_deref(), Some("device"));
                assert_eq!(info.is_online, Some(true));
            }
            other => panic!("expected a node event, got {other:?}"),
        }

        server.await.unwrap();
    }

    #[tokio::test]
    async fn a_node_with_a_mixed_node_and_parameter_child_still_completes_the_tree_fetch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_one_ember(&mut socket).await; // root GetDirectory sent on connect
            read_one_ember(&mut socket).await; // fetch_complete_tree's GetDirectory for "1"

            // "1" has a Node child ("1.1") and a Parameter child ("1.2"), exactly
            // the shape that used to leave the fetch stuck on the Parameter.
            let reply = [
                GlowElement::Node { path: Path::root(1).child(1), contents: Node::default(), children: Vec::new() },
                GlowElement::Parameter { path: Path::root(1).child(2), contents: Parameter::default(), children: Vec::new() },
            ];
            let node = ember_glow::encode_root(&reply).unwrap();
            socket.write_all(&ember_s101::encode_ember(&node.encode())).await.unwrap();

            read_one_ember(&mut socket).await; // follow-up GetDirectory for "1.1"

            // "1.1" only has a Parameter child, so the follow-up reply is grouped
            // under "1.1" with nothing left to expand, and must still mark "1.1"
            // complete rather than leaving it stuck in `active` forever.
            let reply = [GlowElement::Parameter {
                path: Path::root(1).child(1).child(1),
                contents: Parameter::default(),
                children: Vec::new(),
            }];
            let node = ember_glow::encode_root(&reply).unwrap();
            socket.write_all(&ember_s101::encode_ember(&node.encode())).await.unwrap();
        });

        let (consumer, mut events) = crate::Consumer::connect(&addr.ip().to_string(), addr.port()).await.unwrap();
        assert_eq!(events.recv().await, Some(Event::Connected));

        consumer.fetch_complete_tree(vec![Path::root(1)]).await.unwrap();

        let mut saw_complete = false;
        for _ in 0..16 {
            match events.recv().await.unwrap() {
                Event::TreeFetchComplete => {
                    saw_complete = true;
                    break;
                }
                _ => continue,
            }
        }
        assert!(saw_complete, "expected TreeFetchComplete even though a Node had a Parameter sibling");

        server.await.unwrap();
    }
}
