//! Metric helpers for `rf24-transport`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops so call sites need no feature gates.

#[cfg(feature = "metrics")]
use ::metrics::{counter, gauge};

/// Name of the counter tracking fragments moved over the link.
pub const FRAGMENTS_TOTAL: &str = "rf24_transport_fragments_total";
/// Name of the counter tracking dropped inbound fragments.
pub const FRAGMENTS_DROPPED: &str = "rf24_transport_fragments_dropped_total";
/// Name of the counter tracking complete messages by direction.
pub const MESSAGES_TOTAL: &str = "rf24_transport_messages_total";
/// Name of the counter tracking aborted sends.
pub const SEND_FAILURES: &str = "rf24_transport_send_failures_total";
/// Name of the counter tracking evicted reassembly buffers.
pub const BUFFERS_EVICTED: &str = "rf24_transport_buffers_evicted_total";
/// Name of the gauge tracking free reassembly buffers.
pub const BUFFERS_FREE: &str = "rf24_transport_buffers_free";

/// Direction of fragment or message processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Received from a remote node.
    Inbound,
    /// Sent to a remote node.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record one fragment for the given direction.
#[cfg(feature = "metrics")]
pub fn inc_fragments(direction: Direction) {
    counter!(FRAGMENTS_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record one fragment for the given direction.
#[cfg(not(feature = "metrics"))]
pub fn inc_fragments(_direction: Direction) {}

/// Record a dropped inbound fragment with its reason label.
#[cfg(feature = "metrics")]
pub fn inc_dropped(reason: &'static str) {
    counter!(FRAGMENTS_DROPPED, "reason" => reason).increment(1);
}

/// Record a dropped inbound fragment with its reason label.
#[cfg(not(feature = "metrics"))]
pub fn inc_dropped(_reason: &'static str) {}

/// Record one complete message for the given direction.
#[cfg(feature = "metrics")]
pub fn inc_messages(direction: Direction) {
    counter!(MESSAGES_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record one complete message for the given direction.
#[cfg(not(feature = "metrics"))]
pub fn inc_messages(_direction: Direction) {}

/// Record an aborted send.
#[cfg(feature = "metrics")]
pub fn inc_send_failures() { counter!(SEND_FAILURES).increment(1); }

/// Record an aborted send.
#[cfg(not(feature = "metrics"))]
pub fn inc_send_failures() {}

/// Record `count` evicted reassembly buffers.
#[cfg(feature = "metrics")]
pub fn add_evicted(count: u64) { counter!(BUFFERS_EVICTED).increment(count); }

/// Record `count` evicted reassembly buffers.
#[cfg(not(feature = "metrics"))]
pub fn add_evicted(_count: u64) {}

/// Publish the current number of free reassembly buffers.
#[cfg(feature = "metrics")]
#[expect(
    clippy::cast_precision_loss,
    reason = "pool capacities are far below f64 precision limits"
)]
pub fn set_free_buffers(free: usize) { gauge!(BUFFERS_FREE).set(free as f64); }

/// Publish the current number of free reassembly buffers.
#[cfg(not(feature = "metrics"))]
pub fn set_free_buffers(_free: usize) {}
