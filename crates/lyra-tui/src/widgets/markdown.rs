//! Markdown rendering for terminal UI

use crate::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Renderer state while walking the event stream
struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// One entry per open list; `Some(n)` is the next number of an ordered list
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    code_block: String,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![theme.base_style()],
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            code_block: String::new(),
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn quote_prefix(&self) -> Option<Span<'static>> {
        (self.quote_depth > 0).then(|| {
            Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(self.theme.quote),
            )
        })
    }

    /// Wrap and emit the pending spans
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        let prefix = self.quote_prefix();
        let prefix_width = prefix.as_ref().map(|p| p.content.width()).unwrap_or(0);

        for line in wrap_spans(spans, self.width.saturating_sub(prefix_width)) {
            match &prefix {
                Some(prefix) => {
                    let mut spans = vec![prefix.clone()];
                    spans.extend(line.spans);
                    self.lines.push(Line::from(spans));
                }
                None => self.lines.push(line),
            }
        }
    }

    fn blank_line(&mut self) {
        let last_blank = self
            .lines
            .last()
            .is_some_and(|l| l.spans.iter().all(|s| s.content.trim().is_empty()));
        if !self.lines.is_empty() && !last_blank {
            self.lines.push(Line::from(""));
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let style = match level {
                    HeadingLevel::H1 => self
                        .theme
                        .accent_style()
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    HeadingLevel::H2 => self.theme.accent_style().add_modifier(Modifier::BOLD),
                    HeadingLevel::H3 => self.theme.secondary_bold(),
                    _ => self.theme.accent_style(),
                };
                self.push_style(style);
            }
            Tag::Paragraph => self.flush(),
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(
                    Style::default()
                        .fg(self.theme.quote)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
                self.code_block.clear();
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}{}. ", indent, n);
                        *n += 1;
                        marker
                    }
                    _ => format!("{}• ", indent),
                };
                self.current
                    .push(Span::styled(marker, self.theme.dim_style()));
            }
            Tag::Emphasis => {
                let style = self.style().add_modifier(Modifier::ITALIC);
                self.push_style(style);
            }
            Tag::Strong => {
                let style = self.style().add_modifier(Modifier::BOLD);
                self.push_style(style);
            }
            Tag::Strikethrough => {
                let style = self.style().add_modifier(Modifier::CROSSED_OUT);
                self.push_style(style);
            }
            Tag::Link { .. } => {
                self.push_style(
                    Style::default()
                        .fg(self.theme.link)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
                self.blank_line();
            }
            TagEnd::Paragraph => {
                self.flush();
                // Tight list items get no blank line between them
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                let code_style = Style::default()
                    .fg(self.theme.code)
                    .add_modifier(Modifier::DIM);
                let width = self.width.saturating_sub(2).max(1);
                let code = std::mem::take(&mut self.code_block);
                for code_line in code.lines() {
                    for chunk in chunk_by_width(code_line, width) {
                        self.lines
                            .push(Line::from(Span::styled(format!("  {}", chunk), code_style)));
                    }
                }
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            self.code_block.push_str(text);
        } else {
            let style = self.style();
            self.current.push(Span::styled(text.to_string(), style));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self
            .lines
            .last()
            .is_some_and(|l| l.spans.iter().all(|s| s.content.is_empty()))
        {
            self.lines.pop();
        }
        self.lines
    }
}

/// Convert markdown text to styled ratatui Lines no wider than `width`
pub fn render_markdown(text: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(theme, width.max(1));
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH);

    for event in parser {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(code) => {
                let code_style = Style::default()
                    .fg(theme.code)
                    .add_modifier(Modifier::BOLD);
                renderer.current.push(Span::styled(code.to_string(), code_style));
            }
            Event::SoftBreak => renderer.current.push(Span::raw(" ")),
            Event::HardBreak => renderer.flush(),
            Event::Rule => {
                renderer.flush();
                renderer
                    .lines
                    .push(Line::from(Span::styled("─".repeat(width.min(40)), theme.dim_style())));
            }
            _ => {}
        }
    }

    renderer.finish()
}

/// Split a string into pieces no wider than `width` columns
fn chunk_by_width(text: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut col = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if col + w > width && col > 0 {
            chunks.push(std::mem::take(&mut current));
            col = 0;
        }
        current.push(c);
        col += w;
    }
    chunks.push(current);
    chunks
}

/// Word-wrap styled spans to `width` columns
fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut col = 0;

    for span in spans {
        let style = span.style;
        for token in split_words(&span.content) {
            let is_space = token.chars().all(char::is_whitespace);
            let w = token.width();

            if col + w > width && col > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
                col = 0;
                if is_space {
                    continue;
                }
            }

            if w > width {
                // A single word wider than the line
                let mut pieces = chunk_by_width(token, width).into_iter().peekable();
                while let Some(piece) = pieces.next() {
                    let piece_width = piece.width();
                    current.push(Span::styled(piece, style));
                    if pieces.peek().is_some() {
                        lines.push(Line::from(std::mem::take(&mut current)));
                        col = 0;
                    } else {
                        col = piece_width;
                    }
                }
                continue;
            }

            current.push(Span::styled(token.to_string(), style));
            col += w;
        }
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

/// Split into alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut last_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if last_space.is_some_and(|s| s != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        last_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
