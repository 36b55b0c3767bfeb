//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (user messages, target selection)
    pub accent: Color,
    /// Secondary accent (model header, mode selection)
    pub secondary: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// Code/preformatted text color
    pub code: Color,
    /// Link color
    pub link: Color,
    /// Block quote color
    pub quote: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark slate theme with indigo and purple accents (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::Rgb(226, 232, 240),
            dim: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(129, 140, 248),
            secondary: Color::Rgb(192, 132, 252),
            error: Color::Rgb(248, 113, 113),
            border: Color::Rgb(51, 65, 85),
            code: Color::Rgb(165, 180, 252),
            link: Color::Rgb(96, 165, 250),
            quote: Color::Rgb(148, 163, 184),
        }
    }

    /// Default text
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get bold secondary style
    pub fn secondary_bold(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Get code/preformatted style
    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for a highlighted (selected) option
    pub fn selected_style(&self, color: Color) -> Style {
        Style::default()
            .bg(color)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }
}
