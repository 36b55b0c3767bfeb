//! lyra-agent: Conversation state and the interaction controller
//!
//! This crate owns the chat transcript, caches the upstream session, adapts
//! streamed replies into text fragments and serializes submissions so at most
//! one exchange is in flight.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod events;
pub mod exchange;
pub mod prompts;
pub mod session;
pub mod settings;

pub use controller::{InteractionController, Phase, Rejection, Snapshot, SubmitOutcome};
pub use conversation::{Conversation, Message, MessageId, Role};
pub use error::ConversationError;
pub use events::ChatEvent;
pub use exchange::{FragmentStream, open_exchange};
pub use session::{SessionCache, SessionHandle};
pub use settings::{AppSettings, OptimizationMode, TargetAi};
