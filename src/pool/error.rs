use thiserror::Error;

use super::SlotIndex;
use crate::{fragment::MessageId, network::NodeAddress};

/// Reasons [`BufferPool::allocate`](super::BufferPool::allocate) refuses a message.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AllocateError {
    /// Every slot already holds a buffer.
    #[error("all {capacity} reassembly slots are occupied")]
    PoolExhausted { capacity: usize },
    /// The sender already has a buffer with the same identifier.
    #[error("message {message_id} from {sender} already occupies slot {slot}")]
    DuplicateMessage {
        sender: NodeAddress,
        message_id: MessageId,
        slot: SlotIndex,
    },
}
