//! Core types for chat sessions

use serde::{Deserialize, Serialize};

/// Default Gemini model used for new chat sessions
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL for the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Who produced a turn in the upstream chat history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    /// Wire name used by the Gemini API
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One completed turn of upstream chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Configuration applied to every chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,
    /// Base URL for API calls
    pub base_url: String,
    /// Fixed system instruction sent with every exchange
    pub system_instruction: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl ChatConfig {
    /// Create a config with the default model and temperature
    pub fn with_system(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            ..Default::default()
        }
    }

    /// Override the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: String::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Token usage reported at the end of an exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    Stop,
    /// Maximum tokens reached
    Length,
    /// Blocked by a safety or recitation filter
    Filtered,
}

impl StopReason {
    /// Map a Gemini `finishReason` string
    pub fn from_finish_reason(reason: &str) -> Option<Self> {
        match reason {
            "STOP" => Some(StopReason::Stop),
            "MAX_TOKENS" => Some(StopReason::Length),
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
                Some(StopReason::Filtered)
            }
            _ => None,
        }
    }
}
