//! Shared test fixtures and transports, used by every crate's integration
//! tests rather than each hand-rolling its own.

pub mod duplex;
pub mod fixtures;
pub mod harness;

pub use harness::{connect, wait_for, Harness};

#[cfg(test)]
mod tests {
    use super::*;
    use ember_consumer::Event;

    #[tokio::test]
    async fn harness_connects_and_reports_the_fixture_root() {
        let mut harness = connect(&fixtures::single_parameter_snapshot()).await;
        let event = wait_for(&mut harness.consumer_events, |event| matches!(event, Event::Node(_))).await;
        match event {
            Event::Node(node) => assert_eq!(node.identifier.as_deref(), Some("mixer")),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn duplex_pipe_round_trips_a_raw_ember_payload() {
        let (mut a, mut b) = duplex::pipe(1024);
        duplex::send_ember(&mut a, b"hello").await.unwrap();
        let received = duplex::recv_ember(&mut b).await.unwrap();
        assert_eq!(received, b"hello");
    }
}
