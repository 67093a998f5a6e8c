//! Position of a DATA fragment within its logical message.
//!
//! Provides [`FragmentSequence`], a type-safe wrapper around the `u16`
//! sequence field that also knows where its body lands in the reassembled
//! payload.

use std::num::TryFromIntError;

use derive_more::{Display, From};

use super::FRAGMENT_BODY_SIZE;

/// Zero-based ordinal of a DATA fragment.
///
/// # Examples
///
/// ```
/// use rf24_transport::fragment::FragmentSequence;
/// let sequence = FragmentSequence::new(3);
/// assert_eq!(sequence.get(), 3);
/// assert_eq!(sequence.payload_offset(), 57);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct FragmentSequence(u16);

impl FragmentSequence {
    /// Construct a sequence from its wire value.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the first DATA sequence.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Byte offset in the reassembled payload where this fragment's body starts.
    #[must_use]
    pub const fn payload_offset(self) -> usize { self.0 as usize * FRAGMENT_BODY_SIZE }

    /// Increment the sequence, returning `None` on overflow.
    #[must_use]
    pub fn checked_increment(self) -> Option<Self> { self.0.checked_add(1).map(Self) }
}

impl TryFrom<usize> for FragmentSequence {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u16::try_from(value).map(Self) }
}

impl From<FragmentSequence> for u16 {
    fn from(value: FragmentSequence) -> Self { value.0 }
}
