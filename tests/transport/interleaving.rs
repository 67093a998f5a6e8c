//! Interleaving tests for fragments of concurrent messages.
//!
//! Placement depends only on each fragment's message id and sequence, so
//! fragments of different messages may arrive mixed in any order.

use rstest::rstest;
use transport_testing::{
    NodePair,
    RECEIVER,
    SENDER,
    data_frame,
    head_frame,
    node_pair,
    patterned_payload,
    tail_frame,
};

fn inject_all(nodes: &NodePair, frames: &[[u8; 23]]) {
    for frame in frames {
        assert!(nodes.medium.inject(SENDER, RECEIVER, frame));
    }
}

fn interleaved_a_and_b(with_last_a_chunk: bool) -> Vec<[u8; 23]> {
    let a = patterned_payload(40);
    let b = b"ten bytes!";
    let mut frames = vec![
        head_frame(1, 40),
        head_frame(2, 10),
        data_frame(1, 0, &a[..19]),
        data_frame(2, 0, b),
        data_frame(1, 1, &a[19..38]),
    ];
    if with_last_a_chunk {
        frames.push(data_frame(1, 2, &a[38..]));
    }
    frames.extend([tail_frame(1), tail_frame(2)]);
    frames
}

#[rstest]
#[case::every_chunk(true)]
#[case::last_chunk_missing(false)]
fn a_tail_before_b_tail_completes_both(mut node_pair: NodePair, #[case] with_last_a_chunk: bool) {
    inject_all(&node_pair, &interleaved_a_and_b(with_last_a_chunk));

    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_dropped, 0);
    assert_eq!(summary.messages_completed, 2);

    let a = node_pair.receiver.receive(usize::MAX).expect("A ready");
    let b = node_pair.receiver.receive(usize::MAX).expect("B ready");
    assert_eq!(a.message_id().get(), 1);
    assert_eq!(b.message_id().get(), 2);
    assert_eq!(b.payload(), b"ten bytes!");

    let expected = patterned_payload(40);
    assert_eq!(a.payload().len(), 40);
    assert_eq!(&a.payload()[..38], &expected[..38]);
    if with_last_a_chunk {
        assert_eq!(&a.payload()[38..], &expected[38..]);
    } else {
        assert_eq!(&a.payload()[38..], &[0_u8, 0]);
    }
    assert_eq!(node_pair.receiver.free_buffer_count(), 16);
}

#[rstest]
fn interleaved_messages_both_complete(mut node_pair: NodePair) {
    let a = patterned_payload(40);
    let b: Vec<u8> = b"short message".to_vec();

    inject_all(
        &node_pair,
        &[
            head_frame(1, 40),
            head_frame(2, 13),
            data_frame(1, 0, &a[..19]),
            data_frame(2, 0, &b),
            data_frame(1, 1, &a[19..38]),
            data_frame(1, 2, &a[38..]),
            tail_frame(2),
            tail_frame(1),
        ],
    );

    let summary = node_pair.receiver.poll();
    assert_eq!(summary.fragments_received, 8);
    assert_eq!(summary.fragments_dropped, 0);
    assert_eq!(summary.messages_completed, 2);

    let first = node_pair.receiver.receive(128).expect("first message");
    let second = node_pair.receiver.receive(128).expect("second message");
    assert_eq!(first.message_id().get(), 1);
    assert_eq!(first.payload(), a.as_slice());
    assert_eq!(second.message_id().get(), 2);
    assert_eq!(second.payload(), b.as_slice());
    assert_eq!(node_pair.receiver.free_buffer_count(), 16);
}

#[rstest]
fn data_fragments_may_arrive_out_of_order(mut node_pair: NodePair) {
    let payload = patterned_payload(57);
    inject_all(
        &node_pair,
        &[
            head_frame(3, 57),
            data_frame(3, 2, &payload[38..]),
            data_frame(3, 0, &payload[..19]),
            data_frame(3, 1, &payload[19..38]),
            tail_frame(3),
        ],
    );

    node_pair.receiver.poll();
    let message = node_pair.receiver.receive(usize::MAX).expect("message ready");
    assert_eq!(message.payload(), payload.as_slice());
}

#[rstest]
fn completed_messages_are_served_by_slot_not_completion(mut node_pair: NodePair) {
    inject_all(
        &node_pair,
        &[
            head_frame(10, 1),
            head_frame(11, 1),
            data_frame(10, 0, b"x"),
            data_frame(11, 0, b"y"),
            tail_frame(11),
            tail_frame(10),
        ],
    );
    node_pair.receiver.poll();

    let order: Vec<u8> = std::iter::from_fn(|| node_pair.receiver.receive(1))
        .map(|message| message.message_id().get())
        .collect();
    assert_eq!(order, vec![10, 11]);
}

#[rstest]
fn fragments_spread_over_several_polls(mut node_pair: NodePair) {
    let payload = patterned_payload(30);
    inject_all(&node_pair, &[head_frame(4, 30), data_frame(4, 0, &payload[..19])]);
    node_pair.receiver.poll();
    assert!(!node_pair.receiver.has_message());

    node_pair.advance(1_000);
    inject_all(&node_pair, &[data_frame(4, 1, &payload[19..]), tail_frame(4)]);
    node_pair.receiver.poll();
    assert!(node_pair.receiver.has_message());
    assert_eq!(
        node_pair.receiver.receive(usize::MAX).expect("message ready").payload(),
        payload.as_slice()
    );
}
