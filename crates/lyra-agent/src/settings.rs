//! User-selected settings and the context tag built from them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform the optimized prompt is meant for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetAi {
    #[default]
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
    Gemini,
    Other,
}

impl TargetAi {
    /// All targets in display order
    pub const ALL: [TargetAi; 4] = [
        TargetAi::ChatGpt,
        TargetAi::Claude,
        TargetAi::Gemini,
        TargetAi::Other,
    ];

    /// Human-readable name, also used in the context tag
    pub const fn label(&self) -> &'static str {
        match self {
            TargetAi::ChatGpt => "ChatGPT",
            TargetAi::Claude => "Claude",
            TargetAi::Gemini => "Gemini",
            TargetAi::Other => "Other",
        }
    }

    /// The next target, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TargetAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetAi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatgpt" | "gpt" | "openai" => Ok(TargetAi::ChatGpt),
            "claude" => Ok(TargetAi::Claude),
            "gemini" => Ok(TargetAi::Gemini),
            "other" => Ok(TargetAi::Other),
            other => Err(format!(
                "unknown target '{}' (expected chatgpt, claude, gemini or other)",
                other
            )),
        }
    }
}

/// How thorough the optimization should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    #[default]
    Basic,
    Detail,
}

impl OptimizationMode {
    /// Both modes in display order
    pub const ALL: [OptimizationMode; 2] = [OptimizationMode::Basic, OptimizationMode::Detail];

    /// Value sent in the context tag
    pub const fn tag(&self) -> &'static str {
        match self {
            OptimizationMode::Basic => "BASIC",
            OptimizationMode::Detail => "DETAIL",
        }
    }

    /// Title shown in the settings panel
    pub const fn title(&self) -> &'static str {
        match self {
            OptimizationMode::Basic => "Basic Mode",
            OptimizationMode::Detail => "Detail Mode",
        }
    }

    /// One-line description shown under the title
    pub const fn description(&self) -> &'static str {
        match self {
            OptimizationMode::Basic => "Quick fix, core techniques, ready-to-use.",
            OptimizationMode::Detail => "Interactive, clarifying questions, comprehensive.",
        }
    }

    /// Input placeholder for this mode
    pub fn placeholder(&self) -> &'static str {
        match self {
            OptimizationMode::Basic => "Enter your rough prompt here...",
            OptimizationMode::Detail => "Describe your request in detail (Enter to send)",
        }
    }

    /// Footer line shown under the input
    pub fn footer(&self) -> &'static str {
        match self {
            OptimizationMode::Basic => "Basic Mode Active: Quick optimization.",
            OptimizationMode::Detail => "Detailed Mode Active: I might ask questions.",
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            OptimizationMode::Basic => OptimizationMode::Detail,
            OptimizationMode::Detail => OptimizationMode::Basic,
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for OptimizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(OptimizationMode::Basic),
            "detail" | "detailed" => Ok(OptimizationMode::Detail),
            other => Err(format!("unknown mode '{}' (expected basic or detail)", other)),
        }
    }
}

/// Settings chosen in the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub target_ai: TargetAi,
    pub mode: OptimizationMode,
}

impl AppSettings {
    /// The machine-readable tag describing these settings
    pub fn context_tag(&self) -> String {
        format!(
            "[CONTEXT - Target: {}, Mode: {}]",
            self.target_ai.label(),
            self.mode.tag()
        )
    }

    /// Outbound payload: the context tag followed by the user text
    pub fn build_payload(&self, text: &str) -> String {
        format!("{} {}", self.context_tag(), text)
    }
}
