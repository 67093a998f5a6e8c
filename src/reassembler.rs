//! Inbound dispatcher that routes fragments into the buffer pool.
//!
//! [`Reassembler`] mirrors the outbound [`Fragmenter`](crate::fragment::Fragmenter):
//! a HEAD allocates a slot sized to the declared length, each DATA writes its
//! body at `sequence × 19`, and a TAIL marks the buffer complete. Fragments of
//! different messages may interleave freely because every fragment names its
//! message and DATA placement depends only on the sequence number.
//!
//! Completion means "a TAIL was seen". The link layer acknowledges every
//! fragment, so a missing DATA fragment only happens when the sender aborted,
//! in which case no TAIL follows and the reaper reclaims the slot.
//!
//! Buffers are keyed by sender and message id together: every node numbers
//! its own messages from zero, so two leaves talking to one base routinely
//! share ids. Rejected fragments are reported as [`ReassemblyError`] and never
//! disturb other buffers.

use std::{num::NonZeroUsize, time::Duration};

use bincode::error::DecodeError;
use log::debug;
use thiserror::Error;

use crate::{
    clock::Timestamp,
    fragment::{Fragment, FragmentDecodeError, FragmentKind, FragmentSequence, MessageId},
    message::Message,
    network::NodeAddress,
    pool::{AllocateError, BufferPool, ReassemblyBuffer, SlotIndex},
    reaper::{Eviction, reap},
};

/// Effect of a fragment the reassembler accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accepted {
    /// A HEAD claimed a new slot.
    Started { slot: SlotIndex },
    /// A HEAD restarted a receiving buffer from the same sender.
    Restarted { slot: SlotIndex },
    /// A DATA fragment wrote `len` bytes at `offset`.
    Written {
        slot: SlotIndex,
        offset: usize,
        len: usize,
    },
    /// A TAIL completed the message held in `slot`.
    Completed { slot: SlotIndex },
}

/// Reasons an inbound fragment was dropped.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The frame could not be decoded as a fragment.
    #[error("malformed fragment: {0}")]
    Malformed(#[from] FragmentDecodeError),
    /// No slot was free for a new HEAD.
    #[error("no free reassembly slot for message {message_id} (capacity {capacity})")]
    PoolExhausted {
        message_id: MessageId,
        capacity: usize,
    },
    /// A HEAD declared more bytes than the configured limit.
    #[error("message {message_id} declares {declared} bytes, above the {limit} byte limit")]
    MessageTooLarge {
        message_id: MessageId,
        declared: u32,
        limit: usize,
    },
    /// A HEAD reused an identifier whose message from the same sender is
    /// complete but not yet read.
    #[error("message {message_id} from {sender} collides with an unread complete message")]
    IdCollision {
        message_id: MessageId,
        sender: NodeAddress,
    },
    /// A DATA or TAIL fragment named a message with no active buffer for
    /// its sender.
    #[error("no active buffer for {kind} fragment of message {message_id}")]
    UnknownMessage {
        message_id: MessageId,
        kind: FragmentKind,
    },
    /// A DATA fragment starts at or beyond the declared payload length.
    #[error(
        "data fragment {sequence} of message {message_id} starts at byte {offset}, beyond the \
         {len} byte payload"
    )]
    OffsetOutOfBounds {
        message_id: MessageId,
        sequence: FragmentSequence,
        offset: usize,
        len: usize,
    },
    /// A DATA or TAIL fragment arrived after the message completed.
    #[error("{kind} fragment for message {message_id} arrived after it completed")]
    AlreadyComplete {
        message_id: MessageId,
        kind: FragmentKind,
    },
}

impl ReassemblyError {
    /// Short label naming the drop reason, used in logs and metric labels.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::PoolExhausted { .. } => "pool_exhausted",
            Self::MessageTooLarge { .. } => "too_large",
            Self::IdCollision { .. } => "id_collision",
            Self::UnknownMessage { .. } => "unknown_message",
            Self::OffsetOutOfBounds { .. } => "out_of_bounds",
            Self::AlreadyComplete { .. } => "already_complete",
        }
    }
}

/// A fully reassembled payload handed to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    source: NodeAddress,
    message_id: MessageId,
    payload: Vec<u8>,
}

impl ReceivedMessage {
    /// Construct a new [`ReceivedMessage`].
    #[must_use]
    pub fn new(source: NodeAddress, message_id: MessageId, payload: Vec<u8>) -> Self {
        Self {
            source,
            message_id,
            payload,
        }
    }

    /// Node that sent the message.
    #[must_use]
    pub const fn source(&self) -> NodeAddress { self.source }

    /// Identifier the message travelled under.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Borrow the payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.payload.as_slice() }

    /// Consume the message, returning the owned payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> { self.payload }

    /// Consume the message, returning its sender and payload.
    #[must_use]
    pub fn into_parts(self) -> (NodeAddress, Vec<u8>) { (self.source, self.payload) }

    /// Decode the payload into a strongly typed message.
    ///
    /// # Errors
    ///
    /// Returns any [`DecodeError`] raised while deserialising the payload.
    pub fn decode<M: Message>(&self) -> Result<M, DecodeError> {
        let (message, _) = M::from_bytes(self.payload())?;
        Ok(message)
    }
}

/// Stateful fragment dispatcher over a fixed [`BufferPool`].
#[derive(Debug)]
pub struct Reassembler {
    pool: BufferPool,
    max_message_size: NonZeroUsize,
}

impl Reassembler {
    /// Create a reassembler with `capacity` slots that refuses HEAD fragments
    /// declaring more than `max_message_size` bytes.
    #[must_use]
    pub fn new(capacity: NonZeroUsize, max_message_size: NonZeroUsize) -> Self {
        Self {
            pool: BufferPool::new(capacity),
            max_message_size,
        }
    }

    /// Borrow the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &BufferPool { &self.pool }

    /// Number of empty slots.
    #[must_use]
    pub fn free_buffer_count(&self) -> usize { self.pool.free_slot_count() }

    /// Whether a complete message is waiting to be read.
    #[must_use]
    pub fn has_complete(&self) -> bool { self.pool.has_complete() }

    /// Decode a raw link frame from `sender` and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Malformed`] when the frame does not decode,
    /// otherwise as [`Reassembler::accept`].
    pub fn accept_frame(
        &mut self,
        sender: NodeAddress,
        frame: &[u8],
        now: Timestamp,
    ) -> Result<Accepted, ReassemblyError> {
        let fragment = Fragment::decode(frame)?;
        self.accept(sender, &fragment, now)
    }

    /// Dispatch one fragment received from `sender` at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReassemblyError`] describing why the fragment was dropped.
    pub fn accept(
        &mut self,
        sender: NodeAddress,
        fragment: &Fragment,
        now: Timestamp,
    ) -> Result<Accepted, ReassemblyError> {
        match fragment.kind() {
            FragmentKind::Head => self.accept_head(sender, fragment, now),
            FragmentKind::Data => self.accept_data(sender, fragment),
            FragmentKind::Tail => self.accept_tail(sender, fragment),
        }
    }

    /// Evict incomplete buffers older than `timeout`.
    pub fn reap(&mut self, now: Timestamp, timeout: Duration) -> Vec<Eviction> {
        reap(&mut self.pool, now, timeout)
    }

    /// Remove the first complete message in slot order, truncated to `max_len`.
    ///
    /// Slot order is not completion order: when several messages are
    /// complete, the one in the lowest slot is served first.
    pub fn take_complete(&mut self, max_len: usize) -> Option<ReceivedMessage> {
        let slot = self.pool.first_complete()?;
        let buffer = self.pool.release(slot)?;
        let source = buffer.source();
        let message_id = buffer.message_id();
        let mut payload = buffer.into_payload();
        payload.truncate(max_len);
        Some(ReceivedMessage::new(source, message_id, payload))
    }

    fn accept_head(
        &mut self,
        sender: NodeAddress,
        fragment: &Fragment,
        now: Timestamp,
    ) -> Result<Accepted, ReassemblyError> {
        let message_id = fragment.message_id();
        let declared = fragment.declared_len().unwrap_or_default();
        let limit = self.max_message_size.get();
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= limit)
            .ok_or(ReassemblyError::MessageTooLarge {
                message_id,
                declared,
                limit,
            })?;

        match self.pool.allocate(message_id, len, sender, now) {
            Ok(slot) => Ok(Accepted::Started { slot }),
            Err(AllocateError::PoolExhausted { capacity }) => Err(ReassemblyError::PoolExhausted {
                message_id,
                capacity,
            }),
            Err(AllocateError::DuplicateMessage { slot, .. }) => {
                if !self.pool.restart(slot, len, now) {
                    return Err(ReassemblyError::IdCollision { message_id, sender });
                }
                debug!(
                    "restarted reassembly: message_id={message_id}, source={sender}, \
                     slot={slot}, len={len}"
                );
                Ok(Accepted::Restarted { slot })
            }
        }
    }

    fn accept_data(
        &mut self,
        sender: NodeAddress,
        fragment: &Fragment,
    ) -> Result<Accepted, ReassemblyError> {
        let message_id = fragment.message_id();
        let slot = self.active_slot(sender, fragment)?;
        let buffer = self
            .pool
            .receiving_mut(slot)
            .ok_or(ReassemblyError::AlreadyComplete {
                message_id,
                kind: FragmentKind::Data,
            })?;

        let offset = fragment.sequence().payload_offset();
        let len = buffer.write_at(offset, fragment.body()).ok_or(
            ReassemblyError::OffsetOutOfBounds {
                message_id,
                sequence: fragment.sequence(),
                offset,
                len: buffer.payload_len(),
            },
        )?;
        Ok(Accepted::Written { slot, offset, len })
    }

    fn accept_tail(
        &mut self,
        sender: NodeAddress,
        fragment: &Fragment,
    ) -> Result<Accepted, ReassemblyError> {
        let message_id = fragment.message_id();
        let slot = self.active_slot(sender, fragment)?;
        if !self.pool.mark_complete(slot) {
            return Err(ReassemblyError::AlreadyComplete {
                message_id,
                kind: FragmentKind::Tail,
            });
        }
        debug!(
            "reassembly complete: message_id={message_id}, source={sender}, slot={slot}, len={}",
            self.pool.get(slot).map_or(0, ReassemblyBuffer::payload_len)
        );
        Ok(Accepted::Completed { slot })
    }

    fn active_slot(
        &self,
        sender: NodeAddress,
        fragment: &Fragment,
    ) -> Result<SlotIndex, ReassemblyError> {
        let message_id = fragment.message_id();
        self.pool
            .find(sender, message_id)
            .ok_or(ReassemblyError::UnknownMessage {
                message_id,
                kind: fragment.kind(),
            })
    }
}
