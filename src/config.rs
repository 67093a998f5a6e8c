//! Settings that bound reassembly resource usage.

use std::{num::NonZeroUsize, time::Duration};

use crate::fragment::MessageId;

/// Number of reassembly buffers a transport keeps by default.
pub const DEFAULT_POOL_CAPACITY: NonZeroUsize = NonZeroUsize::new(16).expect("non-zero");

/// Age after which an incomplete reassembly buffer is evicted by default.
pub const DEFAULT_REASSEMBLY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Largest payload sent or reassembled by default, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: NonZeroUsize = NonZeroUsize::new(16 * 1024).expect("non-zero");

/// Tunables for a [`Transport`](crate::Transport).
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Duration};
///
/// use rf24_transport::TransportConfig;
/// let config = TransportConfig::default()
///     .with_pool_capacity(NonZeroUsize::new(4).expect("non-zero"))
///     .with_reassembly_timeout(Duration::from_secs(2));
/// assert_eq!(config.pool_capacity.get(), 4);
/// assert_eq!(config.reassembly_timeout, Duration::from_secs(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Number of messages that may be reassembled concurrently.
    pub pool_capacity: NonZeroUsize,
    /// Incomplete buffers older than this are evicted on the next poll.
    pub reassembly_timeout: Duration,
    /// Hard cap on outbound payloads and on HEAD-declared inbound lengths.
    pub max_message_size: NonZeroUsize,
    /// Identifier used for the first outbound message.
    pub initial_message_id: MessageId,
}

impl TransportConfig {
    /// Replace the reassembly pool capacity.
    #[must_use]
    pub const fn with_pool_capacity(mut self, pool_capacity: NonZeroUsize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    /// Replace the reassembly timeout.
    #[must_use]
    pub const fn with_reassembly_timeout(mut self, reassembly_timeout: Duration) -> Self {
        self.reassembly_timeout = reassembly_timeout;
        self
    }

    /// Replace the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, max_message_size: NonZeroUsize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    /// Replace the identifier of the first outbound message.
    #[must_use]
    pub const fn with_initial_message_id(mut self, initial_message_id: MessageId) -> Self {
        self.initial_message_id = initial_message_id;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            reassembly_timeout: DEFAULT_REASSEMBLY_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            initial_message_id: MessageId::new(0),
        }
    }
}
