//! Outbound helper that splits payloads into HEAD, DATA and TAIL fragments.
//!
//! [`Fragmenter`] owns the outbound [`MessageId`] counter. The counter only
//! advances when the caller reports a fully acknowledged send through
//! [`Fragmenter::advance_message_id`], so an aborted send leaves the next
//! message with the same identifier.

use std::num::NonZeroUsize;

use super::{
    FRAGMENT_BODY_SIZE,
    Fragment,
    FragmentKind,
    FragmentSequence,
    FragmentationError,
    MessageId,
};

/// Number of fragments needed to carry a payload of `payload_len` bytes.
///
/// One HEAD, `ceil(payload_len / 19)` DATA fragments and one TAIL.
///
/// # Examples
///
/// ```
/// use rf24_transport::fragment::fragment_count;
/// assert_eq!(fragment_count(0), 2);
/// assert_eq!(fragment_count(19), 3);
/// assert_eq!(fragment_count(73), 6);
/// ```
#[must_use]
pub const fn fragment_count(payload_len: usize) -> usize {
    2 + payload_len.div_ceil(FRAGMENT_BODY_SIZE)
}

/// Splits payloads into link-sized fragments.
#[derive(Debug)]
pub struct Fragmenter {
    max_message_size: NonZeroUsize,
    next_message_id: MessageId,
}

impl Fragmenter {
    /// Create a fragmenter that refuses payloads above `max_message_size` bytes.
    #[must_use]
    pub const fn new(max_message_size: NonZeroUsize) -> Self {
        Self::with_starting_id(max_message_size, MessageId::new(0))
    }

    /// Create a fragmenter whose first message uses `start_at`.
    #[must_use]
    pub const fn with_starting_id(max_message_size: NonZeroUsize, start_at: MessageId) -> Self {
        Self {
            max_message_size,
            next_message_id: start_at,
        }
    }

    /// Return the largest payload accepted, in bytes.
    #[must_use]
    pub const fn max_message_size(&self) -> NonZeroUsize { self.max_message_size }

    /// Identifier the next message will be sent with.
    #[must_use]
    pub const fn next_message_id(&self) -> MessageId { self.next_message_id }

    /// Move to a fresh identifier after a message was fully acknowledged.
    ///
    /// Returns the identifier that was retired.
    pub fn advance_message_id(&mut self) -> MessageId {
        let retired = self.next_message_id;
        self.next_message_id = retired.wrapping_next();
        retired
    }

    /// Split `payload` into fragments tagged with the next message identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::PayloadTooLarge`] when the payload exceeds
    /// the configured limit or cannot be described by the 32-bit length
    /// field, and [`FragmentationError::SequenceOverflow`] when it needs more
    /// DATA fragments than the 16-bit sequence can number.
    pub fn fragment(&self, payload: impl AsRef<[u8]>) -> Result<FragmentBatch, FragmentationError> {
        self.fragment_with_id(self.next_message_id, payload)
    }

    /// Split `payload` into fragments tagged with `message_id`.
    ///
    /// # Errors
    ///
    /// See [`Fragmenter::fragment`].
    pub fn fragment_with_id(
        &self,
        message_id: MessageId,
        payload: impl AsRef<[u8]>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let payload = payload.as_ref();
        let len = payload.len();
        if len > self.max_message_size.get() {
            return Err(FragmentationError::PayloadTooLarge {
                len,
                limit: self.max_message_size.get(),
            });
        }
        let declared = u32::try_from(len).map_err(|_| FragmentationError::PayloadTooLarge {
            len,
            limit: u32::MAX as usize,
        })?;

        let mut fragments = Vec::with_capacity(fragment_count(len));
        fragments.push(Fragment::head(message_id, declared));

        for (index, chunk) in payload.chunks(FRAGMENT_BODY_SIZE).enumerate() {
            let sequence = FragmentSequence::try_from(index).map_err(|_| {
                FragmentationError::SequenceOverflow {
                    last: FragmentSequence::new(u16::MAX),
                }
            })?;
            let fragment = Fragment::data(message_id, sequence, chunk).ok_or(
                FragmentationError::PayloadTooLarge {
                    len: chunk.len(),
                    limit: FRAGMENT_BODY_SIZE,
                },
            )?;
            fragments.push(fragment);
        }

        fragments.push(Fragment::tail(message_id));
        Ok(FragmentBatch::new(message_id, len, fragments))
    }
}

/// Fragments produced for a single logical message, in transmission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    message_id: MessageId,
    payload_len: usize,
    fragments: Vec<Fragment>,
}

impl FragmentBatch {
    fn new(message_id: MessageId, payload_len: usize, fragments: Vec<Fragment>) -> Self {
        debug_assert!(fragments.len() >= 2, "batches always carry HEAD and TAIL");
        Self {
            message_id,
            payload_len,
            fragments,
        }
    }

    /// Return the [`MessageId`] shared by all fragments.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Length of the payload the batch carries.
    #[must_use]
    pub const fn payload_len(&self) -> usize { self.payload_len }

    /// Return the fragments as a slice.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] { self.fragments.as_slice() }

    /// Number of fragments in the batch, HEAD and TAIL included.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches always contain HEAD and TAIL"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.fragments.len() }

    /// Iterate over the DATA fragments only.
    pub fn data_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments
            .iter()
            .filter(|fragment| fragment.kind() == FragmentKind::Data)
    }

    /// Consume the batch, returning all fragments.
    #[must_use]
    pub fn into_fragments(self) -> Vec<Fragment> { self.fragments }
}

impl IntoIterator for FragmentBatch {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter { self.fragments.into_iter() }
}

impl<'a> IntoIterator for &'a FragmentBatch {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter { self.fragments.iter() }
}
