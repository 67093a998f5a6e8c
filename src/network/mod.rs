//! Boundary to the underlying packet network.
//!
//! The transport consumes a link layer that delivers small, ordered,
//! individually acknowledged packets between 16-bit node addresses (the
//! RF24Network model). [`Network`] captures exactly the operations the
//! transport needs; [`memory`] provides an in-process medium for tests and
//! simulations.

use derive_more::{Display, From, Into};
use thiserror::Error;

pub mod memory;

pub use memory::{MemoryLink, MemoryMedium, SentFrame};

/// Address of a node on the link, conventionally written in octal.
///
/// # Examples
///
/// ```
/// use rf24_transport::network::NodeAddress;
/// assert_eq!(NodeAddress::new(0o11).to_string(), "0o11");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0:#o}")]
pub struct NodeAddress(u16);

impl NodeAddress {
    /// Create an address from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the numeric address.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }
}

/// Metadata for a packet copied out of the network by [`Network::receive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arrival {
    /// Node that transmitted the packet.
    pub source: NodeAddress,
    /// Number of bytes written into the caller's buffer.
    pub len: usize,
}

/// Errors reported by [`Network::send`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The destination did not acknowledge the packet.
    #[error("packet to {to} was not acknowledged")]
    NotAcknowledged { to: NodeAddress },
    /// The packet exceeds what the link can carry in one transmission.
    #[error("packet of {len} bytes exceeds the {limit} byte link payload")]
    FrameTooLarge { len: usize, limit: usize },
}

/// Packet network consumed by the transport.
///
/// Implementations are driven from a single thread: the transport calls
/// [`poll`](Network::poll) and then drains packets while
/// [`has_packet`](Network::has_packet) reports more.
pub trait Network {
    /// Advance internal state so newly arrived packets become readable.
    fn poll(&mut self);

    /// Whether a packet is ready for [`receive`](Network::receive).
    fn has_packet(&self) -> bool;

    /// Copy the next packet into `buf`, truncating it to `buf.len()`.
    ///
    /// Returns `None` when no packet is ready.
    fn receive(&mut self, buf: &mut [u8]) -> Option<Arrival>;

    /// Transmit `frame` to `to`, blocking until it is acknowledged or refused.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the packet could not be delivered.
    fn send(&mut self, to: NodeAddress, frame: &[u8]) -> Result<(), LinkError>;
}

impl<N: Network + ?Sized> Network for &mut N {
    fn poll(&mut self) { (**self).poll(); }

    fn has_packet(&self) -> bool { (**self).has_packet() }

    fn receive(&mut self, buf: &mut [u8]) -> Option<Arrival> { (**self).receive(buf) }

    fn send(&mut self, to: NodeAddress, frame: &[u8]) -> Result<(), LinkError> {
        (**self).send(to, frame)
    }
}

impl<N: Network + ?Sized> Network for Box<N> {
    fn poll(&mut self) { (**self).poll(); }

    fn has_packet(&self) -> bool { (**self).has_packet() }

    fn receive(&mut self, buf: &mut [u8]) -> Option<Arrival> { (**self).receive(buf) }

    fn send(&mut self, to: NodeAddress, frame: &[u8]) -> Result<(), LinkError> {
        (**self).send(to, frame)
    }
}
