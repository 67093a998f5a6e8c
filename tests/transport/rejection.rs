//! Rejection tests for fragments the receiver must drop.
//!
//! Each case checks that the offending fragment is counted as dropped and
//! that no other buffer is disturbed. Fragments sharing an id but coming from
//! different senders belong to different messages and are not rejected.

use rf24_transport::{TransportConfig, network::NodeAddress};
use rstest::rstest;
use transport_testing::{
    NodePair,
    RECEIVER,
    SENDER,
    data_frame,
    head_frame,
    node_pair,
    node_pair_with,
    patterned_payload,
    tail_frame,
};

#[rstest]
fn seventeenth_message_is_dropped_when_pool_is_full(mut node_pair: NodePair) {
    for id in 0..16 {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &head_frame(id, 8)));
    }
    node_pair.receiver.poll();
    assert_eq!(node_pair.receiver.free_buffer_count(), 0);

    for frame in [head_frame(16, 2), data_frame(16, 0, b"hi"), tail_frame(16)] {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    }
    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_dropped, 3);
    assert!(!node_pair.receiver.has_message());
    assert_eq!(node_pair.receiver.stats().pool_exhausted, 1);

    assert!(node_pair.medium.inject(SENDER, RECEIVER, &tail_frame(0)));
    node_pair.receiver.poll();
    let message = node_pair.receiver.receive(usize::MAX).expect("existing message intact");
    assert_eq!(message.message_id().get(), 0);
    assert_eq!(node_pair.receiver.free_buffer_count(), 1);
}

fn unknown_kind_frame() -> Vec<u8> {
    let mut frame = tail_frame(1).to_vec();
    frame[3] = 0xff;
    frame
}

#[rstest]
#[case::truncated(vec![0_u8; 22])]
#[case::empty(Vec::new())]
#[case::unknown_kind(unknown_kind_frame())]
#[case::orphan_data(data_frame(9, 0, b"orphan").to_vec())]
#[case::orphan_tail(tail_frame(9).to_vec())]
fn malformed_or_unexpected_frames_are_dropped(mut node_pair: NodePair, #[case] frame: Vec<u8>) {
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_received, 1);
    assert_eq!(summary.fragments_dropped, 1);
    assert!(!node_pair.receiver.has_message());
    assert_eq!(node_pair.receiver.free_buffer_count(), 16);
}

#[rstest]
fn data_beyond_declared_length_leaves_buffer_receiving(mut node_pair: NodePair) {
    for frame in [head_frame(5, 10), data_frame(5, 3, &[1; 19])] {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    }
    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_dropped, 1);
    assert_eq!(node_pair.receiver.free_buffer_count(), 15);
}

#[rstest]
fn unwritten_gaps_read_as_zero(mut node_pair: NodePair) {
    let payload = patterned_payload(38);
    for frame in [head_frame(6, 38), data_frame(6, 1, &payload[19..]), tail_frame(6)] {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    }
    node_pair.receiver.poll();
    let message = node_pair.receiver.receive(usize::MAX).expect("tail completes message");
    assert_eq!(&message.payload()[..19], &[0_u8; 19]);
    assert_eq!(&message.payload()[19..], &payload[19..]);
}

#[rstest]
fn oversized_frames_use_the_first_23_bytes(mut node_pair: NodePair) {
    let mut frame = head_frame(7, 1).to_vec();
    frame.push(0xaa);
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    for frame in [data_frame(7, 0, b"z"), tail_frame(7)] {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    }
    node_pair.receiver.poll();
    assert_eq!(
        node_pair.receiver.receive(usize::MAX).expect("message ready").payload(),
        b"z"
    );
}

#[test]
fn head_above_configured_limit_is_dropped() {
    let config = TransportConfig::default()
        .with_max_message_size(std::num::NonZeroUsize::new(64).expect("non-zero"));
    let mut nodes = node_pair_with(config);
    assert!(nodes.medium.inject(SENDER, RECEIVER, &head_frame(1, 65)));
    let summary = nodes.receiver.poll();
    assert_eq!(summary.fragments_dropped, 1);
    assert_eq!(nodes.receiver.free_buffer_count(), 16);
}

#[rstest]
fn same_id_from_another_sender_is_kept_apart(mut node_pair: NodePair) {
    let neighbour = NodeAddress::new(0o5);
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &head_frame(1, 4)));
    assert!(node_pair.medium.inject(neighbour, RECEIVER, &head_frame(1, 4)));
    assert!(node_pair.medium.inject(neighbour, RECEIVER, &data_frame(1, 0, b"next")));
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &data_frame(1, 0, b"good")));
    assert!(node_pair.medium.inject(SENDER, RECEIVER, &tail_frame(1)));

    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_dropped, 0);
    let message = node_pair.receiver.receive(usize::MAX).expect("message ready");
    assert_eq!(message.source(), SENDER);
    assert_eq!(message.payload(), b"good");
    assert_eq!(node_pair.receiver.free_buffer_count(), 15);

    assert!(node_pair.medium.inject(neighbour, RECEIVER, &tail_frame(1)));
    node_pair.receiver.poll();
    let message = node_pair.receiver.receive(usize::MAX).expect("message ready");
    assert_eq!(message.source(), neighbour);
    assert_eq!(message.payload(), b"next");
}

#[rstest]
fn tail_from_another_sender_does_not_complete_message(mut node_pair: NodePair) {
    let neighbour = NodeAddress::new(0o5);
    for frame in [head_frame(2, 3), data_frame(2, 0, b"abc")] {
        assert!(node_pair.medium.inject(SENDER, RECEIVER, &frame));
    }
    assert!(node_pair.medium.inject(neighbour, RECEIVER, &tail_frame(2)));

    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_dropped, 1);
    assert!(!node_pair.receiver.has_message());
    assert_eq!(node_pair.receiver.free_buffer_count(), 15);
}
