//! Tests for the step/debug ingress and the debug output modes.

use latticebft_events::{factory, Event, EventKind, EventList};
use latticebft_modules::{Module, ModuleError, Modules, PassiveModule};
use latticebft_node::{DebugMode, Node, NodeConfig, NodeError};
use latticebft_types::ModuleId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

struct Collector {
    seen: mpsc::UnboundedSender<Event>,
}

impl PassiveModule for Collector {
    fn apply_events(&mut self, events: EventList) -> Result<EventList, ModuleError> {
        for event in events {
            let _ = self.seen.send(event);
        }
        Ok(EventList::new())
    }
}

fn collector_modules(seen: mpsc::UnboundedSender<Event>) -> Modules {
    Modules::new()
        .register("sink", Module::passive(Collector { seen }))
        .expect("registration")
}

#[tokio::test]
async fn test_step_is_refused_without_debug_mode() {
    let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
    let node = Node::new(collector_modules(seen_tx), NodeConfig::new());

    assert_eq!(
        node.step(EventList::of(factory::testing_uint("sink", 1))),
        Err(NodeError::DebugDisabled)
    );
    assert!(node.debug_output().is_none());
}

#[tokio::test]
async fn test_stepped_events_reach_modules_like_submitted_ones() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let node = Arc::new(Node::new(
        collector_modules(seen_tx),
        NodeConfig::new().with_debug_mode(DebugMode::Tap),
    ));
    let mut debug_out = node.debug_output().expect("tap mode has a debug output");

    let run = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.run(CancellationToken::new()).await })
    };

    node.step(EventList::of(factory::testing_uint("sink", 7)))
        .expect("step");

    // The module sees the stepped event.
    let event = timeout(TEST_TIMEOUT, seen_rx.recv())
        .await
        .expect("module receives stepped event")
        .expect("channel open");
    assert_eq!(event.kind, EventKind::TestingUint(7));

    // And the tap sees the same partition.
    let tapped = timeout(TEST_TIMEOUT, debug_out.recv())
        .await
        .expect("tap receives partition")
        .expect("channel open");
    assert_eq!(tapped.len(), 1);

    node.stop();
    let _ = timeout(TEST_TIMEOUT, run).await.expect("run joins");
}

#[tokio::test]
async fn test_divert_mode_observes_and_drops() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let node = Arc::new(Node::new(
        collector_modules(seen_tx),
        NodeConfig::new().with_debug_mode(DebugMode::Divert),
    ));
    let mut debug_out = node.debug_output().expect("divert mode has a debug output");

    let run = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.run(CancellationToken::new()).await })
    };

    node.step(EventList::of(factory::testing_uint("sink", 9)))
        .expect("step");

    let diverted = timeout(TEST_TIMEOUT, debug_out.recv())
        .await
        .expect("debug output receives partition")
        .expect("channel open");
    assert_eq!(diverted.len(), 1);
    let diverted_event = diverted.iter().next().expect("one event");
    assert_eq!(diverted_event.kind, EventKind::TestingUint(9));

    // The module never sees diverted events.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(seen_rx.try_recv().is_err());

    node.stop();
    let _ = timeout(TEST_TIMEOUT, run).await.expect("run joins");
}

#[tokio::test]
async fn test_divert_mode_still_fails_on_unknown_destination() {
    let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
    let node = Arc::new(Node::new(
        collector_modules(seen_tx),
        NodeConfig::new().with_debug_mode(DebugMode::Divert),
    ));
    let _debug_out = node.debug_output().expect("divert mode has a debug output");

    let run = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.run(CancellationToken::new()).await })
    };

    node.step(EventList::of(factory::testing_uint("ghost", 1)))
        .expect("step");

    // Diverted or not, the destination must resolve.
    let result = timeout(TEST_TIMEOUT, run)
        .await
        .expect("run joins")
        .expect("task joins");
    assert_eq!(
        result,
        Err(NodeError::UnknownDestination {
            destination: ModuleId::from("ghost"),
        })
    );
}

#[tokio::test]
async fn test_step_fails_after_termination() {
    let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
    let node = Arc::new(Node::new(
        collector_modules(seen_tx),
        NodeConfig::new().with_debug_mode(DebugMode::Tap),
    ));

    let run = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.run(CancellationToken::new()).await })
    };

    node.stop();
    let result = timeout(TEST_TIMEOUT, run)
        .await
        .expect("run joins")
        .expect("task joins");
    assert_eq!(result, Ok(()));

    assert_eq!(
        node.step(EventList::of(factory::testing_uint("sink", 1))),
        Err(NodeError::Stopped)
    );
    assert_eq!(
        node.submit(EventList::of(factory::testing_uint("sink", 1))),
        Err(NodeError::Stopped)
    );
}

#[tokio::test]
async fn test_initial_events_are_processed_at_start() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let node = Arc::new(Node::new(
        collector_modules(seen_tx),
        NodeConfig::new().with_initial_events(EventList::of(factory::init("sink"))),
    ));

    let run = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.run(CancellationToken::new()).await })
    };

    let event = timeout(TEST_TIMEOUT, seen_rx.recv())
        .await
        .expect("module receives initial event")
        .expect("channel open");
    assert_eq!(event.kind, EventKind::Init);

    node.stop();
    let _ = timeout(TEST_TIMEOUT, run).await.expect("run joins");
}
