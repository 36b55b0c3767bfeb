//! Conversation state: the ordered message list and the fragment-folding rule.

use crate::error::ConversationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

/// A chat message as the user sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    /// True while a model reply is still arriving
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    fn new(role: Role, text: impl Into<String>, is_streaming: bool) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            is_streaming,
        }
    }

    /// Create a finalized user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, false)
    }

    /// Create a finalized model message
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text, false)
    }

    /// Create an empty, streaming model message
    pub fn placeholder() -> Self {
        Self::new(Role::Model, String::new(), true)
    }
}

/// Ordered conversation; insertion order is chronological order.
///
/// At most one message is streaming, and if so it is the last one and has
/// role `Model`.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Number of leading seed messages kept across `clear`
    seed_len: usize,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation opened by a finalized model greeting
    pub fn with_welcome(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::model(text)],
            seed_len: 1,
        }
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there are no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The reply currently arriving, if any
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.is_streaming)
    }

    /// Append a user message with the text exactly as typed
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<Message, ConversationError> {
        self.ensure_not_streaming()?;
        let message = Message::user(text);
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Open an empty streaming model reply
    pub fn append_model_placeholder(&mut self) -> Result<Message, ConversationError> {
        self.ensure_not_streaming()?;
        let message = Message::placeholder();
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Append a fragment to the open reply
    pub fn fold_fragment(&mut self, id: MessageId, fragment: &str) -> Result<(), ConversationError> {
        let target = self.open_placeholder_mut(id)?;
        target.text.push_str(fragment);
        Ok(())
    }

    /// Close the open reply; its text is immutable afterwards
    pub fn finalize(&mut self, id: MessageId) -> Result<(), ConversationError> {
        let target = self.open_placeholder_mut(id)?;
        target.is_streaming = false;
        Ok(())
    }

    /// Remove the open reply after a failed exchange
    pub fn rollback_last(&mut self) -> Result<Message, ConversationError> {
        let last = self.messages.last().ok_or(ConversationError::Empty)?;
        if last.role != Role::Model || !last.is_streaming {
            return Err(ConversationError::NoOpenPlaceholder);
        }
        self.messages.pop().ok_or(ConversationError::Empty)
    }

    /// Drop everything except the seed messages
    pub fn clear(&mut self) {
        self.messages.truncate(self.seed_len);
    }

    fn ensure_not_streaming(&self) -> Result<(), ConversationError> {
        if self.streaming_message().is_some() {
            return Err(ConversationError::AlreadyStreaming);
        }
        Ok(())
    }

    fn open_placeholder_mut(&mut self, id: MessageId) -> Result<&mut Message, ConversationError> {
        let index = self
            .messages
            .iter()
            .position(|m| m.id == id)
            .ok_or(ConversationError::UnknownMessage(id))?;

        if index + 1 != self.messages.len() {
            return Err(ConversationError::NotLatest(id));
        }

        let target = &mut self.messages[index];
        if !target.is_streaming {
            return Err(ConversationError::NotStreaming(id));
        }
        Ok(target)
    }
}
