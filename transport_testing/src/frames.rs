//! Builders for raw fragment frames and test payloads.
//!
//! Frames are returned already encoded so tests can inject them straight
//! onto a [`MemoryMedium`](rf24_transport::network::MemoryMedium), including
//! sequences a well-behaved sender would never produce.

use rf24_transport::{FRAGMENT_WIRE_SIZE, Fragment, FragmentSequence, MessageId};

/// Encoded HEAD frame declaring `total_len` bytes.
pub fn head_frame(message_id: u8, total_len: u32) -> [u8; FRAGMENT_WIRE_SIZE] {
    Fragment::head(MessageId::new(message_id), total_len).encode()
}

/// Encoded DATA frame carrying `chunk` at position `sequence`.
///
/// # Panics
///
/// Panics if `chunk` exceeds the fragment body size.
pub fn data_frame(message_id: u8, sequence: u16, chunk: &[u8]) -> [u8; FRAGMENT_WIRE_SIZE] {
    Fragment::data(
        MessageId::new(message_id),
        FragmentSequence::new(sequence),
        chunk,
    )
    .expect("chunk fits a fragment body")
    .encode()
}

/// Encoded TAIL frame.
pub fn tail_frame(message_id: u8) -> [u8; FRAGMENT_WIRE_SIZE] {
    Fragment::tail(MessageId::new(message_id)).encode()
}

/// Deterministic payload of `len` bytes whose content varies per position.
///
/// The 251-byte period is prime, so misplaced fragments change the bytes
/// observed at a given offset.
pub fn patterned_payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).expect("remainder below 251"))
        .collect()
}
