//! Fixed-size wire representation of a single transport fragment.
//!
//! Every fragment occupies exactly [`FRAGMENT_WIRE_SIZE`] bytes so it fits a
//! single link-layer packet:
//!
//! ```text
//! +------------+---------------+--------+----------------------+
//! | message_id | sequence (BE) |  kind  |        body          |
//! +------------+---------------+--------+----------------------+
//!      1B             2B           1B             19B
//! ```
//!
//! A HEAD body starts with the total payload length as a big-endian `u32`, a
//! DATA body carries up to [`FRAGMENT_BODY_SIZE`] payload bytes and a TAIL body
//! is zero-filled.

use bytes::{Buf, BufMut};

use super::{FragmentDecodeError, FragmentSequence, MessageId};

/// Maximum number of payload bytes a single fragment can carry.
pub const FRAGMENT_BODY_SIZE: usize = 19;

/// Bytes preceding the body: message id, sequence and kind.
pub const FRAGMENT_HEADER_SIZE: usize = 4;

/// Total encoded size of every fragment.
pub const FRAGMENT_WIRE_SIZE: usize = FRAGMENT_HEADER_SIZE + FRAGMENT_BODY_SIZE;

/// Bytes of a HEAD body used by the declared payload length.
const HEAD_LENGTH_SIZE: usize = std::mem::size_of::<u32>();

/// Role of a fragment within its logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FragmentKind {
    /// Opens a message and declares its total length.
    Head = 0,
    /// Closes a message.
    Tail = 1,
    /// Carries a slice of the payload.
    Data = 2,
}

impl FragmentKind {
    /// Lower-case label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Tail => "tail",
            Self::Data => "data",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl From<FragmentKind> for u8 {
    fn from(kind: FragmentKind) -> Self { kind as u8 }
}

impl TryFrom<u8> for FragmentKind {
    type Error = FragmentDecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Head),
            1 => Ok(Self::Tail),
            2 => Ok(Self::Data),
            other => Err(FragmentDecodeError::UnknownKind(other)),
        }
    }
}

/// One link-sized unit of a logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment {
    message_id: MessageId,
    sequence: FragmentSequence,
    kind: FragmentKind,
    body: [u8; FRAGMENT_BODY_SIZE],
}

impl Fragment {
    /// Build the HEAD fragment announcing a payload of `total_len` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use rf24_transport::fragment::{Fragment, FragmentKind, MessageId};
    /// let head = Fragment::head(MessageId::new(4), 73);
    /// assert_eq!(head.kind(), FragmentKind::Head);
    /// assert_eq!(head.declared_len(), Some(73));
    /// ```
    #[must_use]
    pub fn head(message_id: MessageId, total_len: u32) -> Self {
        let mut body = [0_u8; FRAGMENT_BODY_SIZE];
        let mut cursor = &mut body[..];
        cursor.put_u32(total_len);
        Self {
            message_id,
            sequence: FragmentSequence::zero(),
            kind: FragmentKind::Head,
            body,
        }
    }

    /// Build a DATA fragment carrying `chunk`.
    ///
    /// Returns `None` when `chunk` exceeds [`FRAGMENT_BODY_SIZE`].
    #[must_use]
    pub fn data(message_id: MessageId, sequence: FragmentSequence, chunk: &[u8]) -> Option<Self> {
        let mut body = [0_u8; FRAGMENT_BODY_SIZE];
        body.get_mut(..chunk.len())?.copy_from_slice(chunk);
        Some(Self {
            message_id,
            sequence,
            kind: FragmentKind::Data,
            body,
        })
    }

    /// Build the TAIL fragment closing a message.
    #[must_use]
    pub const fn tail(message_id: MessageId) -> Self {
        Self {
            message_id,
            sequence: FragmentSequence::zero(),
            kind: FragmentKind::Tail,
            body: [0_u8; FRAGMENT_BODY_SIZE],
        }
    }

    /// Identifier of the message this fragment belongs to.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Sequence number; only meaningful for DATA fragments.
    #[must_use]
    pub const fn sequence(&self) -> FragmentSequence { self.sequence }

    /// Role of the fragment.
    #[must_use]
    pub const fn kind(&self) -> FragmentKind { self.kind }

    /// Raw body slot.
    #[must_use]
    pub const fn body(&self) -> &[u8; FRAGMENT_BODY_SIZE] { &self.body }

    /// Payload length announced by a HEAD fragment.
    ///
    /// Returns `None` for DATA and TAIL fragments.
    #[must_use]
    pub fn declared_len(&self) -> Option<u32> {
        if self.kind != FragmentKind::Head {
            return None;
        }
        let mut body = &self.body[..HEAD_LENGTH_SIZE];
        Some(body.get_u32())
    }

    /// Encode the fragment into its fixed wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; FRAGMENT_WIRE_SIZE] {
        let mut frame = [0_u8; FRAGMENT_WIRE_SIZE];
        let mut cursor = &mut frame[..];
        cursor.put_u8(self.message_id.get());
        cursor.put_u16(self.sequence.get());
        cursor.put_u8(u8::from(self.kind));
        cursor.put_slice(&self.body);
        frame
    }

    /// Decode a fragment from a received link frame.
    ///
    /// Bytes beyond [`FRAGMENT_WIRE_SIZE`] are ignored so links that pad
    /// their payloads remain compatible.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentDecodeError::Truncated`] when `frame` is shorter than
    /// [`FRAGMENT_WIRE_SIZE`] and [`FragmentDecodeError::UnknownKind`] when the
    /// kind byte is not recognised.
    pub fn decode(frame: &[u8]) -> Result<Self, FragmentDecodeError> {
        if frame.len() < FRAGMENT_WIRE_SIZE {
            return Err(FragmentDecodeError::Truncated {
                expected: FRAGMENT_WIRE_SIZE,
                actual: frame.len(),
            });
        }

        let mut buf = frame;
        let message_id = MessageId::new(buf.get_u8());
        let sequence = FragmentSequence::new(buf.get_u16());
        let kind = FragmentKind::try_from(buf.get_u8())?;
        let mut body = [0_u8; FRAGMENT_BODY_SIZE];
        buf.copy_to_slice(&mut body);

        Ok(Self {
            message_id,
            sequence,
            kind,
            body,
        })
    }
}
