//! Integration coverage for `transport_testing` helpers.

use rf24_transport::{Fragment, FragmentKind};
use transport_testing::{data_frame, head_frame, node_pair, patterned_payload, tail_frame};

#[test]
fn frame_builders_encode_expected_kinds() {
    let head = Fragment::decode(&head_frame(1, 40)).expect("valid head");
    assert_eq!(head.kind(), FragmentKind::Head);
    assert_eq!(head.declared_len(), Some(40));

    let data = Fragment::decode(&data_frame(1, 2, b"abc")).expect("valid data");
    assert_eq!(data.kind(), FragmentKind::Data);
    assert_eq!(data.sequence().get(), 2);
    assert_eq!(&data.body()[..3], b"abc");

    let tail = Fragment::decode(&tail_frame(1)).expect("valid tail");
    assert_eq!(tail.kind(), FragmentKind::Tail);
}

#[test]
fn patterned_payload_is_deterministic() {
    assert_eq!(patterned_payload(300), patterned_payload(300));
    assert_eq!(patterned_payload(252)[251], 0);
}

#[test]
fn node_pair_delivers_messages() {
    let mut nodes = node_pair();
    let message = nodes.deliver(b"hello").expect("message delivered");
    assert_eq!(message.source(), nodes.sender_address());
    assert_eq!(message.payload(), b"hello");
}

#[test]
fn metrics_capture_answers_repeated_queries() {
    use rf24_transport::metrics::{
        BUFFERS_FREE,
        Direction,
        FRAGMENTS_TOTAL,
        inc_fragments,
        set_free_buffers,
    };
    use transport_testing::MetricsCapture;

    let capture = MetricsCapture::new();
    capture.record(|| {
        inc_fragments(Direction::Outbound);
        inc_fragments(Direction::Inbound);
        set_free_buffers(12);
    });

    assert_eq!(capture.counter(FRAGMENTS_TOTAL, &[("direction", "outbound")]), 1);
    assert_eq!(capture.counter(FRAGMENTS_TOTAL, &[("direction", "outbound")]), 1);
    assert_eq!(capture.counter(FRAGMENTS_TOTAL, &[]), 2);
    assert_eq!(capture.gauge(BUFFERS_FREE), Some(12.0));
    assert_eq!(capture.gauge(BUFFERS_FREE), Some(12.0));

    capture.record(|| {
        inc_fragments(Direction::Outbound);
        set_free_buffers(16);
    });
    assert_eq!(capture.counter(FRAGMENTS_TOTAL, &[("direction", "outbound")]), 2);
    assert_eq!(capture.gauge(BUFFERS_FREE), Some(16.0));
}
