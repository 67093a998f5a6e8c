//! Pairs of transports wired together over a [`MemoryMedium`].

use std::time::Duration;

use rf24_transport::{
    ManualClock,
    ReceivedMessage,
    Transport,
    TransportConfig,
    network::{MemoryLink, MemoryMedium, NodeAddress},
};
use rstest::fixture;

/// Address of the sending node in a [`NodePair`].
pub const SENDER: NodeAddress = NodeAddress::new(0o1);
/// Address of the receiving node in a [`NodePair`].
pub const RECEIVER: NodeAddress = NodeAddress::new(0o0);

/// Transport over the in-memory medium timed by a manual clock.
pub type SimTransport = Transport<MemoryLink, ManualClock>;

/// Two transports sharing a medium and a clock.
pub struct NodePair {
    pub medium: MemoryMedium,
    pub clock: ManualClock,
    pub sender: SimTransport,
    pub receiver: SimTransport,
}

impl NodePair {
    /// Address the receiver listens on.
    pub fn receiver_address(&self) -> NodeAddress { RECEIVER }

    /// Address the sender transmits from.
    pub fn sender_address(&self) -> NodeAddress { SENDER }

    /// Advance the shared clock by `millis`.
    pub fn advance(&self, millis: u64) { self.clock.advance(Duration::from_millis(millis)); }

    /// Send `payload` to the receiver, poll it and return the first complete
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the send is not acknowledged.
    pub fn deliver(&mut self, payload: &[u8]) -> Option<ReceivedMessage> {
        self.sender
            .send(RECEIVER, payload)
            .expect("send acknowledged");
        self.receiver.poll();
        self.receiver.receive(usize::MAX)
    }
}

/// Build a [`NodePair`] with `config` applied to both nodes.
pub fn node_pair_with(config: TransportConfig) -> NodePair {
    let medium = MemoryMedium::new();
    let clock = ManualClock::new();
    let sender = Transport::with_clock(medium.attach(SENDER), clock.clone(), config);
    let receiver = Transport::with_clock(medium.attach(RECEIVER), clock.clone(), config);
    NodePair {
        medium,
        clock,
        sender,
        receiver,
    }
}

/// [`NodePair`] with the default configuration.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn node_pair() -> NodePair { node_pair_with(TransportConfig::default()) }
