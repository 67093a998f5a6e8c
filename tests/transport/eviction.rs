//! Eviction tests for aborted sends and reassembly timeouts.
//!
//! An aborted send leaves a partial buffer at the receiver that never
//! completes; the reaper must reclaim it once the timeout is exceeded while
//! leaving complete-but-unread messages alone.

use std::time::Duration;

use rf24_transport::{FragmentKind, SendError, TransportConfig};
use rstest::rstest;
use transport_testing::{
    NodePair,
    RECEIVER,
    SENDER,
    head_frame,
    node_pair,
    node_pair_with,
    patterned_payload,
};

#[rstest]
fn refused_second_data_fragment_leaves_partial_buffer(mut node_pair: NodePair) {
    // HEAD is attempt 0, so the second DATA fragment is attempt 2.
    node_pair.medium.nack_attempt(2);
    let err = node_pair
        .sender
        .send(RECEIVER, patterned_payload(57))
        .expect_err("second DATA refused");
    assert!(matches!(
        err,
        SendError::NotAcknowledged {
            kind: FragmentKind::Data,
            ..
        }
    ));
    assert_eq!(node_pair.medium.sent_frames().len(), 2);
    assert_eq!(node_pair.medium.send_attempts(), 3);

    node_pair.receiver.poll();
    assert!(!node_pair.receiver.has_message());
    assert_eq!(node_pair.receiver.free_buffer_count(), 15);

    node_pair.advance(5_001);
    let summary = node_pair.receiver.poll();
    assert_eq!(summary.evicted.len(), 1);
    assert!(!node_pair.receiver.has_message());
    assert_eq!(node_pair.receiver.free_buffer_count(), 16);
}

#[rstest]
#[case(4_999, false)]
#[case(5_000, false)]
#[case(5_001, true)]
fn stalled_buffer_is_evicted_strictly_after_timeout(
    mut node_pair: NodePair,
    #[case] elapsed: u64,
    #[case] evicted: bool,
) {
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &head_frame(1, 30)));
    node_pair.receiver.poll();

    node_pair.advance(elapsed);
    let summary = node_pair.receiver.poll();
    assert_eq!(!summary.evicted.is_empty(), evicted);
    assert_eq!(
        node_pair.receiver.free_buffer_count(),
        if evicted { 16 } else { 15 }
    );
    assert!(!node_pair.receiver.has_message());
}

#[rstest]
fn complete_messages_survive_the_timeout(mut node_pair: NodePair) {
    node_pair
        .sender
        .send(RECEIVER, b"keep me")
        .expect("acknowledged");
    node_pair.receiver.poll();

    node_pair.advance(60_000);
    let summary = node_pair.receiver.poll();
    assert!(summary.evicted.is_empty());
    assert!(node_pair.receiver.has_message());
    assert_eq!(
        node_pair.receiver.receive(usize::MAX).expect("message kept").payload(),
        b"keep me"
    );
}

#[rstest]
fn eviction_precedes_dispatch_within_a_poll(mut node_pair: NodePair) {
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &head_frame(2, 30)));
    node_pair.receiver.poll();

    node_pair.advance(6_000);
    node_pair
        .sender
        .send(RECEIVER, b"fresh")
        .expect("acknowledged");
    let summary = node_pair.receiver.poll();
    assert_eq!(summary.evicted.len(), 1);
    assert_eq!(summary.messages_completed, 1);
    assert_eq!(node_pair.receiver.free_buffer_count(), 15);
}

#[test]
fn custom_timeout_is_honoured() {
    let config = TransportConfig::default().with_reassembly_timeout(Duration::from_millis(50));
    let mut nodes = node_pair_with(config);
    assert!(nodes.medium.inject(SENDER, RECEIVER, &head_frame(3, 10)));
    nodes.receiver.poll();

    nodes.advance(51);
    assert_eq!(nodes.receiver.poll().evicted.len(), 1);
    assert_eq!(nodes.receiver.stats().buffers_evicted, 1);
}

#[rstest]
fn retried_send_completes_after_abort(mut node_pair: NodePair) {
    node_pair.medium.nack_attempt(2);
    let payload = patterned_payload(57);
    assert!(node_pair.sender.send(RECEIVER, &payload).is_err());
    let message = node_pair.deliver(&payload).expect("retry delivered");
    assert_eq!(message.payload(), payload.as_slice());
    assert_eq!(node_pair.receiver.free_buffer_count(), 16);
}
