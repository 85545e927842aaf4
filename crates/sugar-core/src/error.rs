//! Error types for the interaction collaborator.

use thiserror::Error;

/// Errors returned by [`Interaction`](crate::Interaction) reply operations.
#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    /// The interaction was already acknowledged.
    #[error("interaction already acknowledged")]
    AlreadyAcknowledged,

    /// The interaction does not support this kind of reply.
    #[error("reply operation '{0}' not supported by this interaction")]
    Unsupported(&'static str),

    /// The platform rejected or failed the reply.
    #[error("failed to send reply: {0}")]
    SendFailed(String),
}

impl ReplyError {
    /// Creates a send failure with the given message.
    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

/// Result type for reply operations.
pub type ReplyResult<T> = Result<T, ReplyError>;
