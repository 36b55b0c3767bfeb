//! Side panel showing the target platform and optimization mode

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Width the panel asks for when shown
pub const PANEL_WIDTH: u16 = 34;

/// One selectable mode with its explanation
#[derive(Debug, Clone, Copy)]
pub struct ModeOption<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

/// Settings side panel
pub struct SettingsPanel<'a> {
    targets: &'a [&'a str],
    selected_target: usize,
    modes: &'a [ModeOption<'a>],
    selected_mode: usize,
    theme: &'a Theme,
}

/// A row for one option; the current one is marked and highlighted.
fn option_line<'a>(label: &str, is_current: bool, color: Color, theme: &Theme) -> Line<'a> {
    let prefix = if is_current { "● " } else { "○ " };
    let style = if is_current {
        theme.selected_style(color)
    } else {
        theme.dim_style()
    };
    Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("{}{} ", prefix, label), style),
    ])
}

impl<'a> SettingsPanel<'a> {
    pub fn new(
        targets: &'a [&'a str],
        selected_target: usize,
        modes: &'a [ModeOption<'a>],
        selected_mode: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            targets,
            selected_target,
            modes,
            selected_mode,
            theme,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = vec![
            Line::from(Span::styled("✦ Lyra", theme.secondary_bold())),
            Line::from(Span::styled(
                "AI Prompt Optimization Specialist.",
                theme.dim_style(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Target Platform", theme.accent_bold()),
                Span::styled("  ^T", theme.dim_style()),
            ]),
        ];

        for (i, target) in self.targets.iter().enumerate() {
            lines.push(option_line(
                target,
                i == self.selected_target,
                theme.accent,
                theme,
            ));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Optimization Mode", theme.secondary_bold()),
            Span::styled("  ^O", theme.dim_style()),
        ]));

        for (i, mode) in self.modes.iter().enumerate() {
            lines.push(option_line(
                mode.title,
                i == self.selected_mode,
                theme.secondary,
                theme,
            ));
            lines.push(Line::from(Span::styled(
                format!("   {}", mode.description),
                theme.dim_style(),
            )));
        }

        lines
    }
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.lines())
            .style(Style::default())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
