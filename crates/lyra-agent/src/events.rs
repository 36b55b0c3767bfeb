//! Controller event types

use crate::conversation::{Message, MessageId};
use crate::settings::AppSettings;
use serde::{Deserialize, Serialize};

/// Events emitted by the interaction controller.
///
/// Every event means the snapshot changed and the view should re-render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A user message was accepted and appended
    SubmitStarted { message: Message },

    /// An empty model reply was opened
    ReplyStarted { reply_id: MessageId },

    /// A fragment was folded into the open reply
    ReplyDelta { reply_id: MessageId, delta: String },

    /// The reply completed and was finalized
    ReplyFinished { message: Message },

    /// The exchange failed; the reply, if any, was rolled back
    ReplyFailed { message: String },

    /// Submission blocked by missing configuration
    ConfigurationError { message: String },

    /// The banner was hidden by the user
    BannerDismissed,

    /// Target or mode changed
    SettingsChanged { settings: AppSettings },

    /// The conversation was cleared back to its greeting
    Cleared,
}

impl ChatEvent {
    /// Check if this event ends an exchange
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChatEvent::ReplyFinished { .. } | ChatEvent::ReplyFailed { .. }
        )
    }
}
