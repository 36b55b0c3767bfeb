//! Multi-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Rows shown before the box starts scrolling
const DEFAULT_MAX_ROWS: u16 = 6;

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Multi-line text input that grows with its content
#[derive(Debug)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    /// First visible visual row
    scroll: usize,
    /// Placeholder text
    placeholder: String,
    /// Whether the input is focused
    focused: bool,
    /// Maximum visible rows
    max_rows: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            scroll: 0,
            placeholder: String::new(),
            focused: false,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the placeholder text
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Return the content and leave the box empty
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.clear();
        content
    }

    /// Cursor position as a character index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Height the widget wants for the given outer width, borders included
    pub fn height(&self, width: u16) -> u16 {
        let rows = self.rows(Self::inner_width(width)).len() as u16;
        rows.clamp(1, self.max_rows) + 2
    }

    fn inner_width(width: u16) -> usize {
        (width.saturating_sub(2) as usize).max(1)
    }

    /// Split the content into visual rows of at most `width` columns.
    ///
    /// Each row is a `[start, end)` range of character indices; newlines
    /// themselves belong to no row.
    fn rows(&self, width: usize) -> Vec<(usize, usize)> {
        let mut rows = Vec::new();
        let mut start = 0;
        let mut col = 0;

        for (i, c) in self.content.chars().enumerate() {
            if c == '\n' {
                rows.push((start, i));
                start = i + 1;
                col = 0;
                continue;
            }
            let w = char_width(c);
            if col + w > width && col > 0 {
                rows.push((start, i));
                start = i;
                col = 0;
            }
            col += w;
        }
        rows.push((start, self.content.chars().count()));
        rows
    }

    /// Row index and display column of the cursor
    fn cursor_row_col(&self, rows: &[(usize, usize)]) -> (usize, usize) {
        let row = rows
            .iter()
            .rposition(|&(start, end)| start <= self.cursor && self.cursor <= end)
            .unwrap_or(0);
        let start = rows.get(row).map(|r| r.0).unwrap_or(0);
        let col = self
            .content
            .chars()
            .skip(start)
            .take(self.cursor.saturating_sub(start))
            .map(char_width)
            .sum();
        (row, col)
    }

    /// Character index in `row` closest to display column `col`
    fn index_at(&self, row: (usize, usize), col: usize) -> usize {
        let mut width = 0;
        for (offset, c) in self.content.chars().skip(row.0).take(row.1 - row.0).enumerate() {
            let w = char_width(c);
            if width + w > col {
                return row.0 + offset;
            }
            width += w;
        }
        row.1
    }

    /// Get the byte offset for a character index
    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Handle an input action. `width` is the outer width of the box.
    ///
    /// Returns true if the action was consumed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let inner_width = Self::inner_width(width);
        let char_count = self.content.chars().count();

        let handled = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Newline => {
                self.insert_char('\n');
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Up | Action::Down => {
                let rows = self.rows(inner_width);
                let (row, col) = self.cursor_row_col(&rows);
                let target = if *action == Action::Up {
                    row.checked_sub(1)
                } else {
                    Some(row + 1).filter(|r| *r < rows.len())
                };
                match target {
                    Some(target) => {
                        self.cursor = self.index_at(rows[target], col);
                        true
                    }
                    None => false,
                }
            }
            Action::Home => {
                let rows = self.rows(inner_width);
                let (row, _) = self.cursor_row_col(&rows);
                self.cursor = rows[row].0;
                true
            }
            Action::End => {
                let rows = self.rows(inner_width);
                let (row, _) = self.cursor_row_col(&rows);
                self.cursor = rows[row].1;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut new_cursor = self.cursor;

                // Skip trailing whitespace, then the word itself
                while new_cursor > 0 && chars[new_cursor - 1].is_whitespace() {
                    new_cursor -= 1;
                }
                while new_cursor > 0 && !chars[new_cursor - 1].is_whitespace() {
                    new_cursor -= 1;
                }

                let start_byte = self.byte_offset(new_cursor);
                let end_byte = self.byte_offset(self.cursor);
                self.content.drain(start_byte..end_byte);
                self.cursor = new_cursor;
                true
            }
            Action::Paste(text) => {
                let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
                for c in normalized.chars() {
                    self.insert_char(c);
                }
                true
            }
            _ => false,
        };

        if handled {
            self.update_scroll(inner_width);
        }
        handled
    }

    fn insert_char(&mut self, c: char) {
        let byte_offset = self.byte_offset(self.cursor);
        self.content.insert(byte_offset, c);
        self.cursor += 1;
    }

    fn remove_at(&mut self, char_index: usize) {
        let start = self.byte_offset(char_index);
        let end = self.byte_offset(char_index + 1);
        self.content.drain(start..end);
    }

    fn update_scroll(&mut self, inner_width: usize) {
        let rows = self.rows(inner_width);
        let (row, _) = self.cursor_row_col(&rows);
        let visible = self.max_rows as usize;

        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible {
            self.scroll = row + 1 - visible;
        }
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.content.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        } else {
            let rows = self.rows(inner.width as usize);
            let chars: Vec<char> = self.content.chars().collect();
            let lines: Vec<Line> = rows
                .iter()
                .skip(self.scroll)
                .take(inner.height as usize)
                .map(|&(start, end)| Line::from(chars[start..end].iter().collect::<String>()))
                .collect();
            Paragraph::new(lines)
                .style(theme.base_style())
                .render(inner, buf);
        }

        // Render cursor if focused
        if self.focused {
            let rows = self.rows(inner.width as usize);
            let (row, col) = self.cursor_row_col(&rows);
            let Some(visible_row) = row.checked_sub(self.scroll) else {
                return;
            };
            if visible_row < inner.height as usize && col < inner.width as usize {
                let x = inner.x + col as u16;
                let y = inner.y + visible_row as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: u16 = 22; // 20 columns inside the borders

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            let action = if c == '\n' {
                Action::Newline
            } else {
                Action::Char(c)
            };
            input.handle_action(&action, WIDTH);
        }
        input
    }

    #[test]
    fn test_typing_and_newline() {
        let input = typed("hello\nworld");
        assert_eq!(input.content(), "hello\nworld");
        assert_eq!(input.cursor(), 11);
        assert_eq!(input.height(WIDTH), 4);
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut input = typed("ab\ncd");
        input.handle_action(&Action::Left, WIDTH);
        input.handle_action(&Action::Left, WIDTH);
        input.handle_action(&Action::Backspace, WIDTH);
        assert_eq!(input.content(), "abcd");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_up_down_keep_column() {
        let mut input = typed("abcdef\nxy");
        // Cursor is at the end of "xy" (column 2)
        assert!(input.handle_action(&Action::Up, WIDTH));
        assert_eq!(input.cursor(), 2);
        assert!(input.handle_action(&Action::Down, WIDTH));
        assert_eq!(input.cursor(), 9);
        assert!(!input.handle_action(&Action::Down, WIDTH));
    }

    #[test]
    fn test_home_end_work_on_current_line() {
        let mut input = typed("first\nsecond");
        input.handle_action(&Action::Home, WIDTH);
        assert_eq!(input.cursor(), 6);
        input.handle_action(&Action::Up, WIDTH);
        input.handle_action(&Action::End, WIDTH);
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn test_long_line_wraps() {
        let input = typed(&"x".repeat(45));
        assert_eq!(input.rows(20).len(), 3);
        assert_eq!(input.height(WIDTH), 5);
    }

    #[test]
    fn test_height_is_capped() {
        let input = typed("1\n2\n3\n4\n5\n6\n7\n8");
        assert_eq!(input.height(WIDTH), DEFAULT_MAX_ROWS + 2);
    }

    #[test]
    fn test_paste_keeps_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("one\r\ntwo".into()), WIDTH);
        assert_eq!(input.content(), "one\ntwo");
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("make it better  ");
        input.handle_action(&Action::DeleteWord, WIDTH);
        assert_eq!(input.content(), "make it ");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("héllo");
        input.handle_action(&Action::Home, WIDTH);
        input.handle_action(&Action::Right, WIDTH);
        input.handle_action(&Action::Delete, WIDTH);
        assert_eq!(input.content(), "hllo");
    }

    #[test]
    fn test_take_clears() {
        let mut input = typed("send me");
        assert_eq!(input.take(), "send me");
        assert!(input.content().is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
