//! Fragment primitives for carrying large payloads over small link packets.
//!
//! This module collects the wire-level types of the transport: identifiers,
//! the fixed 23-byte fragment layout and the outbound [`Fragmenter`]. Each
//! sub-module focuses on a single concept while the common types are
//! re-exported here.

pub mod error;
pub mod fragmenter;
pub mod id;
pub mod packet;
pub mod sequence;

pub use error::{FragmentDecodeError, FragmentationError};
pub use fragmenter::{FragmentBatch, Fragmenter, fragment_count};
pub use id::MessageId;
pub use packet::{
    FRAGMENT_BODY_SIZE,
    FRAGMENT_HEADER_SIZE,
    FRAGMENT_WIRE_SIZE,
    Fragment,
    FragmentKind,
};
pub use sequence::FragmentSequence;
