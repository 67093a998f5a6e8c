//! Poll-driven transport engine tying fragmentation and reassembly together.
//!
//! [`Transport`] owns the network handle, the outbound [`Fragmenter`] and the
//! inbound [`Reassembler`]. The host drives it from a single loop:
//!
//! 1. [`Transport::poll`] evicts stale buffers, lets the network advance and
//!    dispatches every fragment that arrived.
//! 2. [`Transport::has_message`] and [`Transport::receive`] hand completed
//!    messages to the host.
//! 3. [`Transport::send`] fragments a payload and pushes each fragment
//!    through the network, aborting on the first unacknowledged one.
//!
//! Inbound problems never fail `poll`; they are logged, counted in
//! [`TransportStats`] and, with the `metrics` feature, exported as metrics.

use log::{debug, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::TransportConfig,
    error::SendError,
    fragment::{FRAGMENT_WIRE_SIZE, Fragmenter, MessageId},
    message::Message,
    metrics::{self, Direction},
    network::{Network, NodeAddress},
    reaper::Eviction,
    reassembler::{Accepted, ReassemblyError, Reassembler, ReceivedMessage},
    stats::TransportStats,
};

/// Outcome of a single [`Transport::poll`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Buffers evicted by the reaper at the start of the poll.
    pub evicted: Vec<Eviction>,
    /// Frames read from the network.
    pub fragments_received: usize,
    /// Frames dropped by the dispatcher.
    pub fragments_dropped: usize,
    /// Messages whose TAIL arrived during the poll.
    pub messages_completed: usize,
}

impl PollSummary {
    /// Whether the poll neither read nor evicted anything.
    #[must_use]
    pub fn is_idle(&self) -> bool { self.evicted.is_empty() && self.fragments_received == 0 }
}

/// Fragmentation and reassembly engine over a [`Network`].
///
/// # Examples
///
/// ```
/// use rf24_transport::{
///     Transport,
///     TransportConfig,
///     clock::ManualClock,
///     network::{MemoryMedium, NodeAddress},
/// };
///
/// let medium = MemoryMedium::new();
/// let base = NodeAddress::new(0o0);
/// let leaf = NodeAddress::new(0o1);
/// let clock = ManualClock::new();
/// let mut sender = Transport::with_clock(medium.attach(leaf), clock.clone(), TransportConfig::default());
/// let mut receiver = Transport::with_clock(medium.attach(base), clock, TransportConfig::default());
///
/// sender.send(base, b"hello over the air").expect("acknowledged");
/// receiver.poll();
/// let message = receiver.receive(64).expect("message complete");
/// assert_eq!(message.source(), leaf);
/// assert_eq!(message.payload(), b"hello over the air");
/// ```
#[derive(Debug)]
pub struct Transport<N, C = SystemClock> {
    network: N,
    clock: C,
    config: TransportConfig,
    fragmenter: Fragmenter,
    reassembler: Reassembler,
    stats: TransportStats,
}

impl<N: Network> Transport<N> {
    /// Create a transport timed by the system clock.
    #[must_use]
    pub fn new(network: N, config: TransportConfig) -> Self {
        Self::with_clock(network, SystemClock::new(), config)
    }
}

impl<N: Network, C: Clock> Transport<N, C> {
    /// Create a transport timed by `clock`.
    #[must_use]
    pub fn with_clock(network: N, clock: C, config: TransportConfig) -> Self {
        Self {
            network,
            clock,
            fragmenter: Fragmenter::with_starting_id(
                config.max_message_size,
                config.initial_message_id,
            ),
            reassembler: Reassembler::new(config.pool_capacity, config.max_message_size),
            config,
            stats: TransportStats::default(),
        }
    }

    /// Reap stale buffers, then read and dispatch every waiting fragment.
    pub fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary {
            evicted: self
                .reassembler
                .reap(self.clock.now(), self.config.reassembly_timeout),
            ..PollSummary::default()
        };
        if !summary.evicted.is_empty() {
            let evicted = u64::try_from(summary.evicted.len()).unwrap_or(u64::MAX);
            self.stats.buffers_evicted += evicted;
            metrics::add_evicted(evicted);
        }

        self.network.poll();
        let mut frame = [0_u8; FRAGMENT_WIRE_SIZE];
        while self.network.has_packet() {
            let Some(arrival) = self.network.receive(&mut frame) else {
                break;
            };
            summary.fragments_received += 1;
            self.stats.fragments_received += 1;
            metrics::inc_fragments(Direction::Inbound);

            let len = arrival.len.min(frame.len());
            match self
                .reassembler
                .accept_frame(arrival.source, &frame[..len], self.clock.now())
            {
                Ok(Accepted::Completed { .. }) => summary.messages_completed += 1,
                Ok(_) => {}
                Err(err) => {
                    summary.fragments_dropped += 1;
                    self.record_drop(arrival.source, &err);
                }
            }
        }

        metrics::set_free_buffers(self.free_buffer_count());
        summary
    }

    /// Whether a complete message is waiting to be read.
    #[must_use]
    pub fn has_message(&self) -> bool { self.reassembler.has_complete() }

    /// Take the next complete message, truncated to `max_len` bytes.
    ///
    /// Messages are served in slot order, which need not match completion
    /// order. Returns `None` when nothing is complete.
    pub fn receive(&mut self, max_len: usize) -> Option<ReceivedMessage> {
        let message = self.reassembler.take_complete(max_len)?;
        self.stats.messages_received += 1;
        metrics::inc_messages(Direction::Inbound);
        metrics::set_free_buffers(self.free_buffer_count());
        debug!(
            "message received: message_id={}, source={}, len={}",
            message.message_id(),
            message.source(),
            message.payload().len()
        );
        Some(message)
    }

    /// Fragment `payload` and transmit it to `to`.
    ///
    /// Returns the identifier the message was sent under. The identifier
    /// counter only advances when every fragment was acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Fragmentation`] when the payload cannot be
    /// fragmented, in which case nothing is transmitted, and
    /// [`SendError::NotAcknowledged`] when a fragment is refused, in which case
    /// the remaining fragments are not sent.
    pub fn send(&mut self, to: NodeAddress, payload: impl AsRef<[u8]>) -> Result<MessageId, SendError> {
        let batch = self.fragmenter.fragment(payload)?;
        let message_id = batch.message_id();

        for fragment in &batch {
            if let Err(source) = self.network.send(to, &fragment.encode()) {
                self.stats.send_failures += 1;
                metrics::inc_send_failures();
                warn!(
                    "send aborted: message_id={message_id}, destination={to}, kind={}, \
                     sequence={}, error={source}",
                    fragment.kind(),
                    fragment.sequence()
                );
                return Err(SendError::NotAcknowledged {
                    message_id,
                    kind: fragment.kind(),
                    sequence: fragment.sequence(),
                    source,
                });
            }
            self.stats.fragments_sent += 1;
            metrics::inc_fragments(Direction::Outbound);
        }

        self.fragmenter.advance_message_id();
        self.stats.messages_sent += 1;
        metrics::inc_messages(Direction::Outbound);
        debug!(
            "message sent: message_id={message_id}, destination={to}, len={}, fragments={}",
            batch.payload_len(),
            batch.len()
        );
        Ok(message_id)
    }

    /// Encode `message` with bincode and send it to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Encode`] when serialisation fails, otherwise as
    /// [`Transport::send`].
    pub fn send_message<M: Message>(&mut self, to: NodeAddress, message: &M) -> Result<MessageId, SendError> {
        let bytes = message.to_bytes()?;
        self.send(to, bytes)
    }

    /// Number of reassembly buffers currently free.
    #[must_use]
    pub fn free_buffer_count(&self) -> usize { self.reassembler.free_buffer_count() }

    /// Snapshot of the activity counters.
    #[must_use]
    pub const fn stats(&self) -> TransportStats { self.stats }

    /// Configuration the transport was built with.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig { &self.config }

    /// Identifier the next outbound message will use.
    #[must_use]
    pub const fn next_message_id(&self) -> MessageId { self.fragmenter.next_message_id() }

    /// Borrow the network handle.
    #[must_use]
    pub const fn network(&self) -> &N { &self.network }

    /// Mutably borrow the network handle.
    pub const fn network_mut(&mut self) -> &mut N { &mut self.network }

    /// Borrow the clock.
    #[must_use]
    pub const fn clock(&self) -> &C { &self.clock }

    /// Consume the transport, returning the network and clock.
    ///
    /// Buffered partial and unread messages are discarded.
    pub fn into_parts(self) -> (N, C) { (self.network, self.clock) }

    fn record_drop(&mut self, source: NodeAddress, err: &ReassemblyError) {
        self.stats.record_drop(err);
        metrics::inc_dropped(err.reason());
        match err {
            ReassemblyError::PoolExhausted { .. } => {
                warn!("fragment dropped: source={source}, reason={}, error={err}", err.reason());
            }
            _ => debug!("fragment dropped: source={source}, reason={}, error={err}", err.reason()),
        }
    }
}
