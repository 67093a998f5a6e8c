//! Timeout eviction of stalled reassembly buffers.
//!
//! A buffer whose HEAD arrived longer ago than the reassembly timeout and
//! which has not seen its TAIL is dead weight: its sender either aborted or
//! lost fragments. [`reap`] frees those slots so new messages can allocate.
//! Completed buffers are never evicted here; only the host reading them frees
//! their slots.

use std::time::Duration;

use log::debug;

use crate::{
    clock::Timestamp,
    fragment::MessageId,
    network::NodeAddress,
    pool::{BufferPool, SlotIndex, SlotStatus},
};

/// Record of one buffer removed by [`reap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    /// Slot that was freed.
    pub slot: SlotIndex,
    /// Identifier of the abandoned message.
    pub message_id: MessageId,
    /// Node that sent the abandoned message.
    pub source: NodeAddress,
    /// Bytes the HEAD fragment declared.
    pub declared_len: usize,
    /// Age of the buffer when it was evicted.
    pub age: Duration,
}

/// Release every incomplete buffer older than `timeout`.
///
/// A buffer is evicted only when its age strictly exceeds `timeout`. Returns
/// the evictions in slot order.
pub fn reap(pool: &mut BufferPool, now: Timestamp, timeout: Duration) -> Vec<Eviction> {
    let expired: Vec<Eviction> = pool
        .iter_occupied()
        .filter(|(_, status, buffer)| *status == SlotStatus::Receiving && buffer.age(now) > timeout)
        .map(|(slot, _, buffer)| Eviction {
            slot,
            message_id: buffer.message_id(),
            source: buffer.source(),
            declared_len: buffer.payload_len(),
            age: buffer.age(now),
        })
        .collect();

    for eviction in &expired {
        pool.release(eviction.slot);
        debug!(
            "evicted stale reassembly buffer: message_id={}, source={}, slot={}, age_ms={}",
            eviction.message_id,
            eviction.source,
            eviction.slot,
            eviction.age.as_millis()
        );
    }

    expired
}
