#![doc(html_root_url = "https://docs.rs/rf24-transport/latest")]
//! Public API for the `rf24-transport` library.
//!
//! This crate carries arbitrarily sized messages over a packet network whose
//! payloads are only a couple of dozen bytes, such as an RF24Network mesh.
//! Outbound payloads are split into 23-byte HEAD, DATA and TAIL fragments;
//! inbound fragments are reassembled in a fixed pool of buffers, and buffers
//! that stall are evicted after a timeout. A single poll-driven
//! [`Transport`] ties the pieces together.

pub mod clock;
pub mod config;
pub mod error;
pub mod fragment;
pub mod message;
pub mod metrics;
pub mod network;
pub mod pool;
pub mod reaper;
pub mod reassembler;
pub mod stats;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{
    DEFAULT_MAX_MESSAGE_SIZE,
    DEFAULT_POOL_CAPACITY,
    DEFAULT_REASSEMBLY_TIMEOUT,
    TransportConfig,
};
pub use error::SendError;
pub use fragment::{
    FRAGMENT_BODY_SIZE,
    FRAGMENT_WIRE_SIZE,
    Fragment,
    FragmentBatch,
    FragmentDecodeError,
    FragmentKind,
    FragmentSequence,
    FragmentationError,
    Fragmenter,
    MessageId,
    fragment_count,
};
pub use message::Message;
pub use crate::metrics::Direction;
pub use network::{Arrival, LinkError, Network, NodeAddress};
pub use reaper::Eviction;
pub use reassembler::{Accepted, ReassemblyError, Reassembler, ReceivedMessage};
pub use stats::TransportStats;
pub use transport::{PollSummary, Transport};
