//! Fixed-capacity arena of reassembly buffers.
//!
//! [`BufferPool`] owns one slot per message that may be reassembled at the
//! same time. Each slot is explicitly `Empty`, `Receiving` or `Complete`; a
//! buffer's payload is sized once from its HEAD fragment and lives exactly as
//! long as the slot holding it.
//!
//! The pool enforces two invariants: occupied slots never exceed capacity and
//! no two occupied slots share a sender and [`MessageId`] pair. Every node
//! numbers its own messages, so the same id from two senders names two
//! different messages. Lookups are linear scans in slot order, which is also
//! the order completed messages are served in.

use std::{num::NonZeroUsize, time::Duration};

use derive_more::{Display, From, Into};

use crate::{clock::Timestamp, fragment::MessageId, network::NodeAddress};

mod error;

pub use error::AllocateError;

/// Position of a slot within a [`BufferPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("#{_0}")]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Return the zero-based slot position.
    #[must_use]
    pub const fn get(self) -> usize { self.0 }
}

/// Observable lifecycle stage of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    /// No buffer is held.
    Empty,
    /// HEAD seen, waiting for DATA and TAIL.
    Receiving,
    /// TAIL seen, waiting for the host to read it.
    Complete,
}

/// Receive-side state of one in-flight message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassemblyBuffer {
    message_id: MessageId,
    source: NodeAddress,
    payload: Vec<u8>,
    head_arrival: Timestamp,
}

impl ReassemblyBuffer {
    fn new(message_id: MessageId, source: NodeAddress, len: usize, now: Timestamp) -> Self {
        Self {
            message_id,
            source,
            payload: vec![0; len],
            head_arrival: now,
        }
    }

    /// Identifier of the message being reassembled.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Node that sent the HEAD fragment.
    #[must_use]
    pub const fn source(&self) -> NodeAddress { self.source }

    /// Payload bytes; positions no DATA fragment reached are zero.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Length declared by the HEAD fragment.
    #[must_use]
    pub fn payload_len(&self) -> usize { self.payload.len() }

    /// When the HEAD fragment arrived.
    #[must_use]
    pub const fn head_arrival(&self) -> Timestamp { self.head_arrival }

    /// Time since the HEAD fragment arrived.
    #[must_use]
    pub const fn age(&self, now: Timestamp) -> Duration { now.saturating_duration_since(self.head_arrival) }

    /// Copy `body` into the payload at `offset`, clipped to the declared length.
    ///
    /// Returns the number of bytes written, or `None` when `offset` lies at
    /// or beyond the end of the payload.
    pub fn write_at(&mut self, offset: usize, body: &[u8]) -> Option<usize> {
        if offset >= self.payload.len() {
            return None;
        }
        let len = body.len().min(self.payload.len() - offset);
        self.payload[offset..offset + len].copy_from_slice(&body[..len]);
        Some(len)
    }

    /// Consume the buffer, returning the owned payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> { self.payload }

    fn restart(&mut self, len: usize, now: Timestamp) {
        self.payload.clear();
        self.payload.resize(len, 0);
        self.head_arrival = now;
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Receiving(ReassemblyBuffer),
    Complete(ReassemblyBuffer),
}

impl Slot {
    fn buffer(&self) -> Option<&ReassemblyBuffer> {
        match self {
            Self::Empty => None,
            Self::Receiving(buffer) | Self::Complete(buffer) => Some(buffer),
        }
    }

    fn status(&self) -> SlotStatus {
        match self {
            Self::Empty => SlotStatus::Empty,
            Self::Receiving(_) => SlotStatus::Receiving,
            Self::Complete(_) => SlotStatus::Complete,
        }
    }
}

/// Fixed set of reassembly slots.
#[derive(Debug)]
pub struct BufferPool {
    slots: Box<[Slot]>,
}

impl BufferPool {
    /// Create a pool with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: std::iter::repeat_with(Slot::default)
                .take(capacity.get())
                .collect(),
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Number of empty slots.
    #[must_use]
    pub fn free_slot_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Empty))
            .count()
    }

    /// Number of slots holding a buffer.
    #[must_use]
    pub fn occupied_count(&self) -> usize { self.capacity() - self.free_slot_count() }

    /// Claim the first empty slot for a new message of `declared_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocateError::DuplicateMessage`] when `message_id` from
    /// `source` already occupies a slot and [`AllocateError::PoolExhausted`]
    /// when every slot is occupied.
    pub fn allocate(
        &mut self,
        message_id: MessageId,
        declared_len: usize,
        source: NodeAddress,
        now: Timestamp,
    ) -> Result<SlotIndex, AllocateError> {
        if let Some(slot) = self.find(source, message_id) {
            return Err(AllocateError::DuplicateMessage {
                sender: source,
                message_id,
                slot,
            });
        }

        let capacity = self.capacity();
        let (index, entry) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| matches!(slot, Slot::Empty))
            .ok_or(AllocateError::PoolExhausted { capacity })?;
        *entry = Slot::Receiving(ReassemblyBuffer::new(message_id, source, declared_len, now));
        Ok(SlotIndex(index))
    }

    /// Locate the occupied slot holding `message_id` from `source`.
    #[must_use]
    pub fn find(&self, source: NodeAddress, message_id: MessageId) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| {
                slot.buffer().is_some_and(|buffer| {
                    buffer.source == source && buffer.message_id == message_id
                })
            })
            .map(SlotIndex)
    }

    /// Lifecycle stage of `slot`; out-of-range indices read as empty.
    #[must_use]
    pub fn status(&self, slot: SlotIndex) -> SlotStatus {
        self.slots.get(slot.0).map_or(SlotStatus::Empty, Slot::status)
    }

    /// Borrow the buffer held by `slot`, complete or not.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&ReassemblyBuffer> {
        self.slots.get(slot.0).and_then(Slot::buffer)
    }

    /// Mutably borrow the buffer held by `slot` while it is still receiving.
    pub fn receiving_mut(&mut self, slot: SlotIndex) -> Option<&mut ReassemblyBuffer> {
        match self.slots.get_mut(slot.0)? {
            Slot::Receiving(buffer) => Some(buffer),
            Slot::Empty | Slot::Complete(_) => None,
        }
    }

    /// Reset a receiving buffer to a new declared length and arrival time.
    ///
    /// Returns `false` if `slot` is not receiving.
    pub fn restart(&mut self, slot: SlotIndex, declared_len: usize, now: Timestamp) -> bool {
        let Some(buffer) = self.receiving_mut(slot) else {
            return false;
        };
        buffer.restart(declared_len, now);
        true
    }

    /// Move `slot` from receiving to complete.
    ///
    /// Returns `false` if `slot` was not receiving.
    pub fn mark_complete(&mut self, slot: SlotIndex) -> bool {
        let Some(entry) = self.slots.get_mut(slot.0) else {
            return false;
        };
        match std::mem::take(entry) {
            Slot::Receiving(buffer) => {
                *entry = Slot::Complete(buffer);
                true
            }
            other => {
                *entry = other;
                false
            }
        }
    }

    /// Empty `slot`, handing back the buffer it held.
    pub fn release(&mut self, slot: SlotIndex) -> Option<ReassemblyBuffer> {
        match std::mem::take(self.slots.get_mut(slot.0)?) {
            Slot::Empty => None,
            Slot::Receiving(buffer) | Slot::Complete(buffer) => Some(buffer),
        }
    }

    /// First complete slot in slot order.
    #[must_use]
    pub fn first_complete(&self) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Slot::Complete(_)))
            .map(SlotIndex)
    }

    /// Whether any slot holds a complete message.
    #[must_use]
    pub fn has_complete(&self) -> bool { self.first_complete().is_some() }

    /// Iterate over occupied slots in slot order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (SlotIndex, SlotStatus, &ReassemblyBuffer)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.buffer()
                .map(|buffer| (SlotIndex(index), slot.status(), buffer))
        })
    }
}
