//! TUI implementation for lyra

use crossterm::{clipboard::CopyToClipboard, event::EventStream, queue};
use futures::StreamExt;
use lyra_agent::{InteractionController, Message, OptimizationMode, Role, Snapshot, TargetAi};
use lyra_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        Banner, ChatMessage, InputBox, MessageList, ModeOption, SettingsPanel, Spinner,
        message_list::calculate_message_height, settings_panel::PANEL_WIDTH, spinner::frame_at,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::error::RecvError;

use crate::commands::{CommandResult, execute_command, settings_text};

/// Narrowest terminal that still shows the settings panel
const MIN_WIDTH_FOR_PANEL: u16 = 80;

const TARGET_LABELS: [&str; 4] = [
    TargetAi::ALL[0].label(),
    TargetAi::ALL[1].label(),
    TargetAi::ALL[2].label(),
    TargetAi::ALL[3].label(),
];

const MODE_OPTIONS: [ModeOption<'static>; 2] = [
    ModeOption {
        title: OptimizationMode::ALL[0].title(),
        description: OptimizationMode::ALL[0].description(),
    },
    ModeOption {
        title: OptimizationMode::ALL[1].title(),
        description: OptimizationMode::ALL[1].description(),
    },
];

/// Map conversation messages to display messages
fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => ChatMessage::user(&m.text),
            Role::Model if m.is_streaming => ChatMessage::assistant_streaming(&m.text),
            Role::Model => ChatMessage::assistant(&m.text),
            Role::System => ChatMessage::system(&m.text),
        })
        .collect()
}

/// The newest finished model message
fn last_reply(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Model && !m.is_streaming)
}

/// Ask the terminal to put `text` on the system clipboard (OSC 52)
fn copy_to_clipboard(out: &mut impl Write, text: &str) -> io::Result<()> {
    queue!(out, CopyToClipboard::to_clipboard_from(text))?;
    out.flush()
}

/// TUI application state
pub struct TuiState {
    controller: Arc<InteractionController>,
    /// Model id shown in the title
    model: String,
    /// Input box
    input: InputBox,
    /// Current scroll position; `usize::MAX` follows the latest message
    scroll: usize,
    /// Local output from slash commands, shown after the conversation
    notice: Option<String>,
    /// Whether the settings panel is shown
    show_settings: bool,
    /// Theme
    theme: Theme,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Where clipboard requests are written; the terminal in practice
    clipboard: Box<dyn Write>,
}

impl TuiState {
    pub fn new(controller: Arc<InteractionController>, model: impl Into<String>) -> Self {
        let mut input = InputBox::new();
        input.set_focused(true);

        Self {
            controller,
            model: model.into(),
            input,
            scroll: usize::MAX,
            notice: None,
            show_settings: true,
            theme: Theme::dark(),
            spinner_start: Instant::now(),
            clipboard: Box::new(io::stdout()),
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved during render based on content height
        self.scroll = usize::MAX;
    }

    /// The controller changed something; follow the conversation
    pub fn on_controller_event(&mut self) {
        self.scroll_to_bottom();
    }

    fn panel_visible(&self, total_width: u16) -> bool {
        self.show_settings && total_width >= MIN_WIDTH_FOR_PANEL
    }

    /// Width of the input box for a terminal of `total_width` columns
    pub fn input_width(&self, total_width: u16) -> u16 {
        if self.panel_visible(total_width) {
            total_width.saturating_sub(PANEL_WIDTH)
        } else {
            total_width
        }
    }

    fn show_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
        self.scroll_to_bottom();
    }

    /// Send the input to the controller, or run it as a slash command
    fn submit_input(&mut self) -> bool {
        let content = self.input.content().to_string();
        if content.trim().is_empty() {
            return true;
        }

        if content.trim_start().starts_with('/') {
            self.input.clear();
            return self.run_command(&content);
        }

        // The controller enforces these too; here they only decide whether
        // the typed text stays in the box.
        let snapshot = self.controller.snapshot();
        if !snapshot.is_idle() {
            return true;
        }
        if self.controller.has_credential() {
            self.input.clear();
            self.notice = None;
            self.spinner_start = Instant::now();
        }

        let controller = self.controller.clone();
        tokio::spawn(async move {
            controller.submit(&content).await;
        });
        self.scroll_to_bottom();
        true
    }

    fn run_command(&mut self, input: &str) -> bool {
        let Some(result) = execute_command(input, self.controller.settings()) else {
            return true;
        };

        match result {
            CommandResult::Message(text) => self.show_notice(text),
            CommandResult::Clear => self.clear_conversation(),
            CommandResult::SetTarget(target) => {
                self.controller.set_target(target);
                self.show_notice(format!("Target platform: {}", target.label()));
            }
            CommandResult::SetMode(mode) => {
                self.controller.set_mode(mode);
                self.show_notice(mode.footer());
            }
            CommandResult::ShowSettings => {
                self.show_settings = true;
                self.show_notice(settings_text(self.controller.settings()));
            }
            CommandResult::Exit => return false,
            CommandResult::Unknown(cmd) => self.show_notice(format!(
                "Unknown command: /{}\nType /help for available commands.",
                cmd
            )),
        }
        true
    }

    fn copy_reply(&mut self) {
        let snapshot = self.controller.snapshot();
        let Some(reply) = last_reply(&snapshot.messages) else {
            self.show_notice("No reply to copy yet.");
            return;
        };

        match copy_to_clipboard(&mut self.clipboard, &reply.text) {
            Ok(()) => self.show_notice(format!(
                "Copied reply to clipboard ({} chars).",
                reply.text.chars().count()
            )),
            Err(e) => {
                tracing::warn!(error = %e, "clipboard write failed");
                self.show_notice("Could not copy the reply.");
            }
        }
    }

    fn clear_conversation(&mut self) {
        match self.controller.clear() {
            Ok(()) => {
                self.notice = None;
                self.scroll_to_bottom();
            }
            Err(_) => self.show_notice("Wait for the current reply to finish before clearing."),
        }
    }

    /// Handle keyboard action. Returns false to quit.
    pub fn handle_action(&mut self, action: Action, total_width: u16) -> bool {
        match action {
            Action::Submit => self.submit_input(),
            Action::Quit | Action::Interrupt => false,
            Action::Eof => !self.input.content().is_empty(),
            Action::Escape => {
                if self.controller.banner().is_some() {
                    self.controller.dismiss_error();
                } else if self.notice.is_some() {
                    self.notice = None;
                } else {
                    self.show_settings = false;
                }
                true
            }
            Action::CycleTarget => {
                let settings = self.controller.settings();
                self.controller.set_target(settings.target_ai.next());
                true
            }
            Action::CycleMode => {
                let settings = self.controller.settings();
                self.controller.set_mode(settings.mode.toggled());
                true
            }
            Action::ToggleSettings => {
                self.show_settings = !self.show_settings;
                true
            }
            Action::Clear => {
                self.clear_conversation();
                true
            }
            Action::CopyReply => {
                self.copy_reply();
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(3);
                true
            }
            Action::ScrollDown => {
                self.scroll = self.scroll.saturating_add(3);
                true
            }
            action => {
                let width = self.input_width(total_width);
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let snapshot = self.controller.snapshot();

        let main = if self.panel_visible(size.width) {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(1)])
                .split(size);
            self.render_settings(frame, columns[0], &snapshot);
            columns[1]
        } else {
            size
        };

        self.input.set_placeholder(snapshot.settings.mode.placeholder());

        let banner_height = snapshot
            .banner
            .as_deref()
            .map(|b| Banner::height(b, main.width))
            .unwrap_or(0);

        // Layout: banner, messages (flex), status (1), input, mode footer (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(self.input.height(main.width)),
                Constraint::Length(1),
            ])
            .split(main);

        if let Some(banner) = snapshot.banner.as_deref() {
            frame.render_widget(Banner::new(banner, &self.theme), chunks[0]);
        }

        self.render_messages(frame, chunks[1], &snapshot);
        self.render_status(frame, chunks[2], &snapshot);
        self.input
            .render(chunks[3], frame.buffer_mut(), &self.theme);

        let footer = Paragraph::new(Line::from(Span::styled(
            format!(" {}", snapshot.settings.mode.footer()),
            self.theme.dim_style(),
        )));
        frame.render_widget(footer, chunks[4]);
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let selected_target = TargetAi::ALL
            .iter()
            .position(|t| *t == snapshot.settings.target_ai)
            .unwrap_or(0);
        let selected_mode = OptimizationMode::ALL
            .iter()
            .position(|m| *m == snapshot.settings.mode)
            .unwrap_or(0);

        let panel = SettingsPanel::new(
            &TARGET_LABELS,
            selected_target,
            &MODE_OPTIONS,
            selected_mode,
            &self.theme,
        );
        frame.render_widget(panel, area);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let title = format!(" Lyra │ {} ", self.model);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(title, self.theme.secondary_bold()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let mut messages = to_chat_messages(&snapshot.messages);
        if let Some(notice) = &self.notice {
            messages.push(ChatMessage::system(notice));
        }

        // Leave a column for the scrollbar
        let text_width = inner.width.saturating_sub(1) as usize;
        let content_height = calculate_message_height(&messages, &self.theme, text_width);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let frame_symbol = frame_at(self.spinner_start.elapsed());
        let list_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let message_list = MessageList::new(&messages, &self.theme)
            .scroll(self.scroll)
            .spinner_frame(frame_symbol);
        frame.render_widget(message_list, list_area);

        // Render scrollbar if content overflows
        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(max_scroll)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        if !snapshot.is_idle() {
            let label = format!(
                "Optimizing for {} ({})...",
                snapshot.settings.target_ai.label(),
                snapshot.settings.mode.tag()
            );
            let spinner = Spinner::new(&label, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left_content = format!(
            "{} │ {}",
            snapshot.settings.target_ai.label(),
            snapshot.settings.mode.title()
        );
        let right_content = "^T target │ ^O mode │ ^S panel │ ^Y copy │ ^L clear │ ^C quit";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        // Build the line with spacing
        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(left_content, self.theme.accent_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left_content, self.theme.accent_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Run the TUI application
pub async fn run_tui(controller: Arc<InteractionController>, model: &str) -> anyhow::Result<()> {
    use crossterm::{
        event::{
            DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        },
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState::new(controller.clone(), model);
    let mut controller_rx = controller.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    let result = loop {
        terminal.draw(|frame| state.render(frame))?;
        let area_width = terminal.size()?.width;

        tokio::select! {
            biased;

            // Controller events first so streamed text shows up promptly
            event = controller_rx.recv() => {
                match event {
                    Ok(_) | Err(RecvError::Lagged(_)) => state.on_controller_event(),
                    Err(RecvError::Closed) => break Ok(()),
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(evt)) => {
                        if let Some(action) = event_to_action(evt) {
                            if !state.handle_action(action, area_width) {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => {
                        break Err(anyhow::anyhow!("Event error: {}", e));
                    }
                    None => {
                        break Ok(());
                    }
                }
            }

            // Tick for animations (spinner updates)
            _ = tick_interval.tick() => {}
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lyra_agent::prompts::WELCOME_MESSAGE;
    use lyra_ai::{ChatConfig, ChatSession, SessionProvider, StreamEvent, StreamEventStream};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct EchoSession;

    #[async_trait]
    impl ChatSession for EchoSession {
        async fn send_message_stream(&self, message: &str) -> lyra_ai::Result<StreamEventStream> {
            let delta = message.to_string();
            Ok(Box::pin(futures::stream::iter(vec![StreamEvent::TextDelta {
                delta,
            }])))
        }
    }

    struct EchoProvider;

    impl SessionProvider for EchoProvider {
        fn start_chat(
            &self,
            _api_key: &str,
            _config: &ChatConfig,
        ) -> lyra_ai::Result<Arc<dyn ChatSession>> {
            Ok(Arc::new(EchoSession))
        }
    }

    fn state(credential: Option<&str>) -> TuiState {
        let controller = InteractionController::new(Arc::new(EchoProvider), ChatConfig::default())
            .with_welcome(WELCOME_MESSAGE)
            .with_credential(credential.map(str::to_string));
        TuiState::new(Arc::new(controller), "gemini-2.5-flash")
    }

    /// Clipboard sink the test can read back
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    fn with_clipboard(mut state: TuiState) -> (TuiState, SharedBuffer) {
        let buffer = SharedBuffer::default();
        state.clipboard = Box::new(buffer.clone());
        (state, buffer)
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 100);
        }
    }

    #[test]
    fn test_labels_follow_settings_types() {
        assert_eq!(TARGET_LABELS, ["ChatGPT", "Claude", "Gemini", "Other"]);
        assert_eq!(MODE_OPTIONS[1].title, "Detail Mode");
    }

    #[test]
    fn test_message_mapping() {
        let messages = vec![Message::user("hi"), Message::placeholder(), Message::model("ok")];
        let chat = to_chat_messages(&messages);
        assert_eq!(chat[0].speaker, lyra_tui::widgets::Speaker::User);
        assert!(chat[1].is_streaming);
        assert!(!chat[2].is_streaming);
    }

    #[tokio::test]
    async fn test_settings_shortcuts_update_controller() {
        let mut state = state(Some("k1"));
        state.handle_action(Action::CycleTarget, 100);
        state.handle_action(Action::CycleMode, 100);

        let settings = state.controller.settings();
        assert_eq!(settings.target_ai, TargetAi::Claude);
        assert_eq!(settings.mode, OptimizationMode::Detail);
    }

    #[tokio::test]
    async fn test_slash_commands_do_not_reach_controller() {
        let mut state = state(Some("k1"));
        type_text(&mut state, "/target gemini");
        assert!(state.handle_action(Action::Submit, 100));

        assert_eq!(state.controller.settings().target_ai, TargetAi::Gemini);
        assert_eq!(state.controller.snapshot().messages.len(), 1);
        assert!(state.input.content().is_empty());

        type_text(&mut state, "/quit");
        assert!(!state.handle_action(Action::Submit, 100));
    }

    #[tokio::test]
    async fn test_missing_credential_keeps_input() {
        let mut state = state(None);
        type_text(&mut state, "hello");
        state.handle_action(Action::Submit, 100);

        // The spawned submit runs on this runtime; give it a turn
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(state.input.content(), "hello");
        assert!(state.controller.banner().is_some());

        state.handle_action(Action::Escape, 100);
        assert!(state.controller.banner().is_none());
    }

    #[tokio::test]
    async fn test_submit_clears_input_and_runs_exchange() {
        let mut state = state(Some("k1"));
        let mut rx = state.controller.subscribe();
        type_text(&mut state, "hello");
        state.handle_action(Action::Submit, 100);
        assert!(state.input.content().is_empty());

        loop {
            if let Ok(event) = rx.recv().await {
                if event.is_terminal() {
                    break;
                }
            }
        }
        let snapshot = state.controller.snapshot();
        assert_eq!(snapshot.messages.len(), 3);
        assert!(snapshot.messages[2].text.starts_with("[CONTEXT - Target: ChatGPT"));
    }

    #[test]
    fn test_last_reply_skips_open_placeholder() {
        let messages = vec![Message::model("first"), Message::user("hi"), Message::placeholder()];
        assert_eq!(last_reply(&messages).map(|m| m.text.as_str()), Some("first"));
        assert!(last_reply(&[Message::user("hi")]).is_none());
    }

    #[tokio::test]
    async fn test_copy_reply_writes_latest_reply() {
        let (mut state, clipboard) = with_clipboard(state(Some("k1")));
        let outcome = state.controller.submit("hello").await;
        assert!(matches!(outcome, lyra_agent::SubmitOutcome::Completed { .. }));

        assert!(state.handle_action(Action::CopyReply, 100));

        // OSC 52 carries the reply base64-encoded:
        // "[CONTEXT - Target: ChatGPT, Mode: BASIC] hello"
        let written = clipboard.text();
        assert!(written.starts_with("\x1b]52;"), "got: {:?}", written);
        assert!(written.contains("W0NPTlRFWFQgLSBUYXJnZXQ6IENoYXRHUFQsIE1vZGU6IEJBU0lDXSBoZWxsbw=="));
        assert!(state.notice.as_deref().unwrap().starts_with("Copied reply"));
    }

    #[tokio::test]
    async fn test_copy_reply_without_model_message() {
        let controller = InteractionController::new(Arc::new(EchoProvider), ChatConfig::default());
        let (mut state, clipboard) = with_clipboard(TuiState::new(Arc::new(controller), "m"));

        state.handle_action(Action::CopyReply, 100);

        assert!(clipboard.text().is_empty());
        assert_eq!(state.notice.as_deref(), Some("No reply to copy yet."));
    }
}
