//! Message list widget for displaying chat messages

use crate::theme::Theme;
use crate::widgets::markdown::render_markdown;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    System,
}

/// A single message in the chat
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    /// Message content
    pub content: String,
    /// Whether this is currently streaming
    pub is_streaming: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Create a streaming assistant message
    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            is_streaming: true,
        }
    }

    /// Create a local notice (command output, help)
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            content: content.into(),
            is_streaming: false,
        }
    }
}

/// Render one message into lines that fit `width`
fn message_lines(
    msg: &ChatMessage,
    theme: &Theme,
    width: usize,
    spinner_frame: &str,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (name, style, prefix) = match msg.speaker {
        Speaker::User => ("You", theme.accent_bold(), "▶ "),
        Speaker::Assistant => ("Lyra", theme.secondary_bold(), "◆ "),
        Speaker::System => ("lyra", theme.dim_style().add_modifier(Modifier::BOLD), "● "),
    };

    let header = if msg.is_streaming && !msg.content.is_empty() {
        format!("{}{} ▌", prefix, name)
    } else {
        format!("{}{}", prefix, name)
    };
    lines.push(Line::from(Span::styled(header, style)));

    let content_width = width.saturating_sub(2).max(1);

    match msg.speaker {
        Speaker::Assistant if msg.content.is_empty() && msg.is_streaming => {
            lines.push(Line::from(Span::styled(
                format!("  {} Optimizing...", spinner_frame),
                theme.secondary_bold(),
            )));
        }
        Speaker::Assistant => {
            for line in render_markdown(&msg.content, theme, content_width) {
                let mut spans = vec![Span::raw("  ")];
                spans.extend(line.spans);
                lines.push(Line::from(spans));
            }
        }
        Speaker::User | Speaker::System => {
            let content_style = if msg.speaker == Speaker::System {
                theme.dim_style()
            } else {
                theme.base_style()
            };
            for line in textwrap::wrap(&msg.content, content_width) {
                lines.push(Line::from(Span::styled(format!("  {}", line), content_style)));
            }
        }
    }

    // Empty line between messages
    lines.push(Line::from(""));
    lines
}

/// Render all messages into wrapped lines
pub fn render_messages(
    messages: &[ChatMessage],
    theme: &Theme,
    width: usize,
    spinner_frame: &str,
) -> Vec<Line<'static>> {
    messages
        .iter()
        .flat_map(|msg| message_lines(msg, theme, width, spinner_frame))
        .collect()
}

/// Calculate total height of messages
pub fn calculate_message_height(messages: &[ChatMessage], theme: &Theme, width: usize) -> usize {
    render_messages(messages, theme, width, "").len()
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
    spinner_frame: &'a str,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            spinner_frame: "⋯",
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set the animation frame shown while waiting for a reply
    pub fn spinner_frame(mut self, frame: &'a str) -> Self {
        self.spinner_frame = frame;
        self
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let visible: Vec<Line> = render_messages(
            self.messages,
            self.theme,
            area.width as usize,
            self.spinner_frame,
        )
        .into_iter()
        .skip(self.scroll)
        .take(area.height as usize)
        .collect();

        Paragraph::new(visible).render(area, buf);
    }
}
