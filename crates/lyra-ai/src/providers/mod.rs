//! Chat session providers

pub mod google;

use crate::{ChatConfig, Result, StreamEventStream};
use async_trait::async_trait;
use std::sync::Arc;

/// A live upstream conversation.
///
/// The session remembers earlier completed turns, so each call only carries
/// the new user message.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one message and stream the reply
    async fn send_message_stream(&self, message: &str) -> Result<StreamEventStream>;
}

/// Creates chat sessions bound to a credential
pub trait SessionProvider: Send + Sync {
    /// Start a new conversation with the given credential and configuration
    fn start_chat(&self, api_key: &str, config: &ChatConfig) -> Result<Arc<dyn ChatSession>>;
}
