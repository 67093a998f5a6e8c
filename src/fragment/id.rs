use derive_more::{Display, From, Into};

/// Identifier shared by every fragment of one logical message.
///
/// The identifier occupies a single byte on the wire and wraps after 255, so
/// it only distinguishes messages that are in flight at the same time.
///
/// # Examples
///
/// ```
/// use rf24_transport::fragment::MessageId;
/// let id = MessageId::new(255);
/// assert_eq!(id.get(), 255);
/// assert_eq!(id.wrapping_next(), MessageId::new(0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct MessageId(u8);

impl MessageId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }

    /// Return the identifier that follows this one, wrapping at `u8::MAX`.
    #[must_use]
    pub const fn wrapping_next(self) -> Self { Self(self.0.wrapping_add(1)) }
}
