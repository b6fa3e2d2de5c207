//! Spins up a real [`ember_provider::Provider`] on a loopback port and
//! connects a real [`ember_consumer::Consumer`] to it, for integration
//! tests that exercise both sides of the wire together.

use ember_consumer::{Consumer, Event};
use ember_provider::{Provider, ProviderEvent};
use ember_snapshot::Snapshot;
use tokio::sync::mpsc;

/// A running provider plus a connected consumer, both backed by real
/// loopback sockets.
pub struct Harness {
    pub provider: Provider,
    pub provider_events: mpsc::Receiver<ProviderEvent>,
    pub consumer: Consumer,
    pub consumer_events: mpsc::Receiver<Event>,
}

/// Load `snapshot` into a fresh provider bound to a random port, then
/// connect a consumer to it. The consumer's initial root `GetDirectory`
/// is already in flight when this returns.
pub async fn connect(snapshot: &Snapshot) -> Harness {
    let mut provider = Provider::new();
    provider.load(snapshot).expect("snapshot loads into a fresh store");
    let provider_events = provider.start_listening(0).await.expect("bind a loopback port");
    let addr = provider.local_addr().expect("listener reports its bound address");

    let (consumer, consumer_events) =
        Consumer::connect(&addr.ip().to_string(), addr.port()).await.expect("consumer connects to the provider");

    Harness { provider, provider_events, consumer, consumer_events }
}

/// Drain `events` until `predicate` matches one, returning it. Panics if
/// the channel closes first.
pub async fn wait_for<T>(events: &mut mpsc::Receiver<T>, mut predicate: impl FnMut(&T) -> bool) -> T {
    loop {
        let event = events.recv().await.expect("event channel closed before the expected event arrived");
        if predicate(&event) {
            return event;
        }
    }
}
