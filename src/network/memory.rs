//! In-process radio medium for tests and simulations.
//!
//! [`MemoryMedium`] models a shared link: every [`MemoryLink`] attached to it
//! owns a mailbox keyed by its [`NodeAddress`]. A send lands in the
//! destination's arrival queue and is acknowledged synchronously; the packet
//! becomes readable once the destination calls [`Network::poll`]. Sends to an
//! unattached address are not acknowledged, mirroring a radio that never
//! receives an auto-ack.
//!
//! Faults are injected per send attempt, counted across the whole medium, so
//! tests can refuse e.g. "the third packet anybody sends".

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap, VecDeque},
    num::NonZeroUsize,
    rc::Rc,
};

use super::{Arrival, LinkError, Network, NodeAddress};

/// Largest packet the medium carries, matching an RF24Network payload.
pub const MEMORY_LINK_MTU: usize = 24;

/// Record of a packet the medium acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentFrame {
    /// Transmitting node.
    pub source: NodeAddress,
    /// Receiving node.
    pub destination: NodeAddress,
    /// Packet contents.
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
struct Packet {
    source: NodeAddress,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Mailbox {
    arriving: VecDeque<Packet>,
    ready: VecDeque<Packet>,
}

#[derive(Debug, Default)]
struct MediumState {
    mailboxes: HashMap<NodeAddress, Mailbox>,
    attempts: usize,
    nacked_attempts: BTreeSet<usize>,
    nack_every: Option<NonZeroUsize>,
    sent: Vec<SentFrame>,
}

impl MediumState {
    fn refuses(&self, attempt: usize) -> bool {
        self.nacked_attempts.contains(&attempt)
            || self
                .nack_every
                .is_some_and(|every| (attempt + 1) % every.get() == 0)
    }

    fn deliver(&mut self, source: NodeAddress, destination: NodeAddress, bytes: &[u8]) -> bool {
        let Some(mailbox) = self.mailboxes.get_mut(&destination) else {
            return false;
        };
        mailbox.arriving.push_back(Packet {
            source,
            bytes: bytes.to_vec(),
        });
        true
    }
}

/// Shared medium connecting [`MemoryLink`] endpoints.
///
/// Clones refer to the same medium.
#[derive(Clone, Debug, Default)]
pub struct MemoryMedium {
    state: Rc<RefCell<MediumState>>,
}

impl MemoryMedium {
    /// Create an empty medium.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Attach a node and return its endpoint.
    ///
    /// Attaching an address twice yields two handles onto the same mailbox.
    #[must_use]
    pub fn attach(&self, address: NodeAddress) -> MemoryLink {
        self.state
            .borrow_mut()
            .mailboxes
            .entry(address)
            .or_default();
        MemoryLink {
            address,
            state: Rc::clone(&self.state),
        }
    }

    /// Detach a node, discarding its queued packets.
    pub fn detach(&self, address: NodeAddress) { self.state.borrow_mut().mailboxes.remove(&address); }

    /// Place `frame` in `destination`'s arrival queue as if `source` had sent it.
    ///
    /// The frame bypasses fault injection and is not recorded in
    /// [`sent_frames`](Self::sent_frames). Returns `false` when `destination`
    /// is not attached.
    pub fn inject(&self, source: NodeAddress, destination: NodeAddress, frame: &[u8]) -> bool {
        self.state.borrow_mut().deliver(source, destination, frame)
    }

    /// Refuse the send attempt with zero-based index `attempt`.
    pub fn nack_attempt(&self, attempt: usize) {
        self.state.borrow_mut().nacked_attempts.insert(attempt);
    }

    /// Refuse every `every`-th send attempt.
    pub fn nack_every(&self, every: NonZeroUsize) { self.state.borrow_mut().nack_every = Some(every); }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut state = self.state.borrow_mut();
        state.nacked_attempts.clear();
        state.nack_every = None;
    }

    /// Number of send attempts made so far, refused ones included.
    #[must_use]
    pub fn send_attempts(&self) -> usize { self.state.borrow().attempts }

    /// Packets acknowledged so far, in transmission order.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<SentFrame> { self.state.borrow().sent.clone() }

    /// Packets waiting for `address`, whether or not it has polled yet.
    #[must_use]
    pub fn pending(&self, address: NodeAddress) -> usize {
        self.state
            .borrow()
            .mailboxes
            .get(&address)
            .map_or(0, |mailbox| mailbox.arriving.len() + mailbox.ready.len())
    }
}

/// One node's endpoint on a [`MemoryMedium`].
#[derive(Debug)]
pub struct MemoryLink {
    address: NodeAddress,
    state: Rc<RefCell<MediumState>>,
}

impl MemoryLink {
    /// Address this endpoint transmits from and receives on.
    #[must_use]
    pub const fn address(&self) -> NodeAddress { self.address }
}

impl Network for MemoryLink {
    fn poll(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(mailbox) = state.mailboxes.get_mut(&self.address) {
            let arrived = std::mem::take(&mut mailbox.arriving);
            mailbox.ready.extend(arrived);
        }
    }

    fn has_packet(&self) -> bool {
        self.state
            .borrow()
            .mailboxes
            .get(&self.address)
            .is_some_and(|mailbox| !mailbox.ready.is_empty())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<Arrival> {
        let packet = self
            .state
            .borrow_mut()
            .mailboxes
            .get_mut(&self.address)?
            .ready
            .pop_front()?;
        let len = packet.bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&packet.bytes[..len]);
        Some(Arrival {
            source: packet.source,
            len,
        })
    }

    fn send(&mut self, to: NodeAddress, frame: &[u8]) -> Result<(), LinkError> {
        if frame.len() > MEMORY_LINK_MTU {
            return Err(LinkError::FrameTooLarge {
                len: frame.len(),
                limit: MEMORY_LINK_MTU,
            });
        }

        let mut state = self.state.borrow_mut();
        let attempt = state.attempts;
        state.attempts += 1;
        if state.refuses(attempt) || !state.deliver(self.address, to, frame) {
            return Err(LinkError::NotAcknowledged { to });
        }
        state.sent.push(SentFrame {
            source: self.address,
            destination: to,
            bytes: frame.to_vec(),
        });
        Ok(())
    }
}
