//! Error types emitted by the fragment codec and the outbound fragmenter.

use thiserror::Error;

use super::FragmentSequence;

/// Errors produced while decoding a received link frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentDecodeError {
    /// The frame is shorter than the fixed fragment layout.
    #[error("truncated fragment: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    /// The kind byte does not name HEAD, TAIL or DATA.
    #[error("unknown fragment kind {0}")]
    UnknownKind(u8),
}

/// Errors produced while splitting an outbound payload.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// The payload exceeds the configured or encodable message size.
    #[error("payload of {len} bytes exceeds the {limit} byte message limit")]
    PayloadTooLarge { len: usize, limit: usize },
    /// The payload needs more DATA fragments than the sequence field can number.
    #[error("fragment sequence overflow after {last}")]
    SequenceOverflow { last: FragmentSequence },
}
