//! Error banner shown above the message list

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// One-line error banner with a dismiss hint
pub struct Banner<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> Banner<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }

    /// Rows needed at `width`, borders included
    pub fn height(message: &str, width: u16) -> u16 {
        let inner = width.saturating_sub(2).max(1) as usize;
        // "⚠ " prefix and "  (Esc)" hint
        let len = unicode_width::UnicodeWidthStr::width(message) + 9;
        len.div_ceil(inner) as u16 + 2
    }
}

impl Widget for Banner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.error_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![
            Span::styled("⚠ ", self.theme.error_style()),
            Span::styled(self.message.to_string(), self.theme.error_style()),
            Span::styled("  (Esc)", self.theme.dim_style()),
        ]);
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
