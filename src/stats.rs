//! Per-transport activity counters.
//!
//! [`TransportStats`] is a plain snapshot the host can read at any time
//! through [`Transport::stats`](crate::Transport::stats). Counters only grow
//! and are kept whether or not the `metrics` feature is enabled.

use crate::reassembler::ReassemblyError;

/// Running totals of transport activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Messages whose every fragment was acknowledged.
    pub messages_sent: u64,
    /// Sends aborted because a fragment was refused.
    pub send_failures: u64,
    /// Fragments acknowledged by the link.
    pub fragments_sent: u64,
    /// Frames read from the link, valid or not.
    pub fragments_received: u64,
    /// Inbound frames dropped for any reason.
    pub fragments_dropped: u64,
    /// HEAD fragments dropped because every buffer was occupied.
    pub pool_exhausted: u64,
    /// Incomplete buffers reclaimed by the reaper.
    pub buffers_evicted: u64,
    /// Complete messages handed to the host.
    pub messages_received: u64,
}

impl TransportStats {
    pub(crate) fn record_drop(&mut self, err: &ReassemblyError) {
        self.fragments_dropped += 1;
        if matches!(err, ReassemblyError::PoolExhausted { .. }) {
            self.pool_exhausted += 1;
        }
    }
}
