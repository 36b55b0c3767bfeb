//! Error types for lyra-agent

use crate::conversation::MessageId;
use thiserror::Error;

/// Misuse of the conversation state.
///
/// None of these occur under correct controller usage; the controller treats
/// them as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// No message with this id exists
    #[error("message {0} not found")]
    UnknownMessage(MessageId),

    /// The target message has already been finalized
    #[error("message {0} is not streaming")]
    NotStreaming(MessageId),

    /// The target is not the latest message
    #[error("message {0} is not the latest message")]
    NotLatest(MessageId),

    /// Rollback on an empty conversation
    #[error("cannot roll back an empty conversation")]
    Empty,

    /// Rollback when the last message is not an open model placeholder
    #[error("last message is not an in-progress model reply")]
    NoOpenPlaceholder,

    /// A second placeholder while one is still streaming
    #[error("a model reply is already streaming")]
    AlreadyStreaming,
}
