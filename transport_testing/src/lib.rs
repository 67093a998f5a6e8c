//! Utilities for driving [`Transport`](rf24_transport::Transport) instances
//! over the in-memory medium during tests.
//!
//! The helpers build pairs of nodes sharing a manual clock, craft raw
//! fragment frames for injection, and capture logs and metrics for
//! assertions.
//!
//! ```rust
//! use transport_testing::{node_pair, patterned_payload};
//!
//! let mut nodes = node_pair();
//! let payload = patterned_payload(73);
//! nodes.sender.send(nodes.receiver_address(), &payload).unwrap();
//! nodes.receiver.poll();
//! assert_eq!(nodes.receiver.receive(128).unwrap().payload(), payload.as_slice());
//! ```

pub mod frames;
pub mod logging;
pub mod metrics;
pub mod nodes;

pub use frames::{data_frame, head_frame, patterned_payload, tail_frame};
pub use logging::{LoggerHandle, logger};
pub use crate::metrics::{MetricsCapture, SnapshotEntry, counter_value};
pub use nodes::{NodePair, RECEIVER, SENDER, SimTransport, node_pair, node_pair_with};
