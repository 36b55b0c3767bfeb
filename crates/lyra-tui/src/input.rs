//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEventKind};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Shift+Enter or Alt+Enter: insert a line break
    Newline,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move cursor up
    Up,
    /// Move cursor down
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Mouse wheel up
    ScrollUp,
    /// Mouse wheel down
    ScrollDown,
    /// Escape
    Escape,
    /// Ctrl+C (interrupt)
    Interrupt,
    /// Ctrl+D (EOF)
    Eof,
    /// Ctrl+L (clear conversation)
    Clear,
    /// Ctrl+U (clear input)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Ctrl+T (next target platform)
    CycleTarget,
    /// Ctrl+O (toggle optimization mode)
    CycleMode,
    /// Ctrl+S (show or hide the settings panel)
    ToggleSettings,
    /// Ctrl+Y (copy the latest reply)
    CopyReply,
    /// Paste (from clipboard or bracketed paste)
    Paste(String),
    /// Quit application
    Quit,
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if code == KeyCode::Enter {
        return if modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
            Action::Newline
        } else {
            Action::Submit
        };
    }

    // Handle Ctrl combinations first
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('d') => Action::Eof,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('t') => Action::CycleTarget,
            KeyCode::Char('o') => Action::CycleMode,
            KeyCode::Char('s') => Action::ToggleSettings,
            KeyCode::Char('y') => Action::CopyReply,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('j') => Action::Newline,
            _ => Action::Unknown,
        };
    }

    // Handle Alt combinations
    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    // Regular keys
    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        },
        _ => None,
    }
}
