//! Streaming event types and utilities

use crate::types::{StopReason, Usage};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted by an upstream exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Exchange accepted by the service
    Start { model: String },
    /// Partial text
    TextDelta { delta: String },
    /// Exchange completed successfully
    Done {
        text: String,
        stop_reason: Option<StopReason>,
        usage: Usage,
    },
    /// Error occurred; no further events follow
    Error { message: String },
}

/// A stream of upstream events
pub type StreamEventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Accumulates the reply text of one exchange from streaming events
#[derive(Debug, Default)]
pub struct ReplyBuilder {
    text: String,
    stop_reason: Option<StopReason>,
    usage: Usage,
}

impl ReplyBuilder {
    /// Create a new reply builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text delta
    pub fn push_delta(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    /// Record the finish reason reported by the service
    pub fn set_stop_reason(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
    }

    /// Record token usage reported by the service
    pub fn set_usage(&mut self, usage: Usage) {
        self.usage = usage;
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Build the terminal Done event
    pub fn finish(self) -> StreamEvent {
        StreamEvent::Done {
            text: self.text,
            stop_reason: self.stop_reason,
            usage: self.usage,
        }
    }
}
