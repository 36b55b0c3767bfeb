//! lyra-ai: Streaming chat-session boundary
//!
//! This crate wraps the hosted text-generation service behind a small
//! `ChatSession` trait and provides the Google Gemini implementation.

pub mod error;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use providers::{ChatSession, SessionProvider};
pub use stream::{StreamEvent, StreamEventStream};
pub use types::*;
