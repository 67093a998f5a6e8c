//! Errors surfaced by outbound transport operations.
//!
//! Inbound problems never reach the caller as errors: dropped fragments are
//! logged and counted by [`Transport::poll`](crate::Transport::poll). Sending
//! is the only fallible host-facing operation.

use bincode::error::EncodeError;
use thiserror::Error;

use crate::{
    fragment::{FragmentKind, FragmentSequence, FragmentationError, MessageId},
    network::LinkError,
};

/// Why a message could not be sent.
#[derive(Debug, Error)]
pub enum SendError {
    /// The payload could not be split into fragments.
    #[error(transparent)]
    Fragmentation(#[from] FragmentationError),
    /// A fragment was not acknowledged and the send was aborted.
    ///
    /// Fragments already acknowledged stay with the receiver, which reclaims
    /// them once the reassembly timeout passes.
    #[error("{kind} fragment {sequence} of message {message_id} was not delivered")]
    NotAcknowledged {
        message_id: MessageId,
        kind: FragmentKind,
        sequence: FragmentSequence,
        #[source]
        source: LinkError,
    },
    /// A typed message could not be serialised.
    #[error("failed to encode message: {0}")]
    Encode(#[from] EncodeError),
}

impl SendError {
    /// Identifier of the aborted message, if fragments reached the link.
    #[must_use]
    pub const fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::NotAcknowledged { message_id, .. } => Some(*message_id),
            Self::Fragmentation(_) | Self::Encode(_) => None,
        }
    }
}
