//! TUI implementation for hubchat

use tokio::sync::mpsc;

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use hubchat_ai::Assistant;
use hubchat_relay::{ChatRelay, RelayEvent};
use hubchat_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatMessage, Header, InputBox, MessageList, Spinner, message_list::calculate_message_height,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use std::io::Stdout;
use std::time::{Duration, Instant};

use crate::commands::{CommandResult, execute_command};
use crate::config::Config;

const PAGE: usize = 10;
const WHEEL: usize = 3;

/// Messages sent from key handling to the main loop
#[derive(Debug, PartialEq, Eq)]
pub enum UiMessage {
    /// A question to send to the assistant
    Submit(String),
    /// Slash command
    Command(String),
    Quit,
}

/// TUI application state
pub struct TuiState {
    title: String,
    intro: String,
    assistant_label: String,
    messages: Vec<ChatMessage>,
    input: InputBox,
    /// Lines scrolled off the top of the transcript view
    scroll: usize,
    /// Keep the view pinned to the newest line
    follow: bool,
    is_streaming: bool,
    status: String,
    theme: Theme,
    ui_tx: mpsc::Sender<UiMessage>,
    spinner_start: Instant,
}

impl TuiState {
    pub fn new(
        title: impl Into<String>,
        intro: impl Into<String>,
        assistant_label: impl Into<String>,
        theme: Theme,
        ui_tx: mpsc::Sender<UiMessage>,
    ) -> Self {
        let mut input = InputBox::new().with_placeholder("Type your question...");
        input.set_focused(true);

        Self {
            title: title.into(),
            intro: intro.into(),
            assistant_label: assistant_label.into(),
            messages: vec![],
            input,
            scroll: 0,
            follow: true,
            is_streaming: false,
            status: "Ready".to_string(),
            theme,
            ui_tx,
            spinner_start: Instant::now(),
        }
    }

    /// Apply a relay event to the view
    pub fn handle_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::ConversationStarted { thread_id } => {
                tracing::debug!(%thread_id, "conversation started");
            }
            RelayEvent::UserTurn { text } => {
                self.messages.push(ChatMessage::user(text));
                self.scroll_to_bottom();
            }
            RelayEvent::ReplyStart => {
                self.is_streaming = true;
                self.spinner_start = Instant::now();
                self.status = "Waiting for reply...".to_string();
                self.messages.push(ChatMessage::assistant_streaming(""));
                self.scroll_to_bottom();
            }
            RelayEvent::ReplyUpdate { text } => {
                self.status = "Receiving reply...".to_string();
                match self.messages.last_mut() {
                    Some(last) if last.is_streaming => last.content = text,
                    _ => self.messages.push(ChatMessage::assistant_streaming(text)),
                }
            }
            RelayEvent::ReplyEnd { text } => {
                match self.messages.last_mut() {
                    Some(last) if last.is_streaming => {
                        last.content = text;
                        last.is_streaming = false;
                    }
                    _ => self.messages.push(ChatMessage::assistant(text)),
                }
                self.is_streaming = false;
                self.status = "Ready".to_string();
            }
            RelayEvent::Error { message } => {
                // A failed reply leaves no assistant turn behind.
                if self.messages.last().is_some_and(|m| m.is_streaming) {
                    self.messages.pop();
                }
                self.is_streaming = false;
                self.status = format!("Error: {}", message);
                self.messages.push(ChatMessage::error(message));
                self.scroll_to_bottom();
            }
        }
    }

    /// Mark an exchange as in flight until the relay reports its outcome
    fn begin_exchange(&mut self) {
        self.is_streaming = true;
        self.spinner_start = Instant::now();
        self.status = "Sending question...".to_string();
    }

    fn end_exchange(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            last.is_streaming = false;
        }
        if self.is_streaming {
            self.is_streaming = false;
            self.status = "Ready".to_string();
        }
    }

    /// Show local output such as a command result
    pub fn show_notice(&mut self, content: &str) {
        self.messages.push(ChatMessage::notice(content));
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        // Clamped, and follow re-enabled, on the next render
        self.scroll = self.scroll.saturating_add(lines);
    }

    /// Handle a key action. Returns `false` when the app should exit.
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        match action {
            Action::Submit => {
                // One reply at a time; the text stays in the box meanwhile.
                if self.is_streaming {
                    return true;
                }
                if let Some(text) = self.input.take_submission() {
                    let msg = if text.starts_with('/') {
                        UiMessage::Command(text)
                    } else {
                        UiMessage::Submit(text)
                    };
                    let _ = self.ui_tx.send(msg).await;
                }
                true
            }
            Action::Quit | Action::Interrupt | Action::Escape => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                false
            }
            Action::PageUp => {
                self.scroll_up(PAGE);
                true
            }
            Action::PageDown => {
                self.scroll_down(PAGE);
                true
            }
            _ => {
                self.input.handle_action(&action, width);
                true
            }
        }
    }

    fn handle_mouse(&mut self, kind: MouseEventKind) {
        match kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL),
            MouseEventKind::ScrollDown => self.scroll_down(WHEEL),
            _ => {}
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // The intro only greets an empty chat
        let intro = self.messages.is_empty().then_some(self.intro.as_str());
        let header_height = Header::new(&self.title, &self.theme)
            .intro(intro)
            .height(size.width)
            .min(size.height / 2);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height), // Title and intro
                Constraint::Min(1),                // Messages
                Constraint::Length(1),             // Status
                Constraint::Length(3),             // Input
            ])
            .split(size);

        frame.render_widget(
            Header::new(&self.title, &self.theme).intro(intro),
            chunks[0],
        );
        self.render_messages(frame, chunks[1]);
        self.render_status(frame, chunks[2]);
        self.input
            .render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(format!(" {} ", self.assistant_label));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || self.messages.is_empty() {
            return;
        }

        let content_height = calculate_message_height(&self.messages, inner.width as usize);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        if self.follow || self.scroll >= max_scroll {
            self.scroll = max_scroll;
            self.follow = true;
        }

        let list = MessageList::new(&self.messages, &self.theme)
            .assistant_label(&self.assistant_label)
            .stream_started(self.is_streaming.then_some(self.spinner_start))
            .scroll(self.scroll);
        frame.render_widget(list, inner);

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

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_streaming {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left = &self.status;
        let right = "Enter: send │ PgUp/PgDn: scroll │ /help │ Ctrl+C: quit";
        let left_style = if self.status.starts_with("Error") {
            self.theme.error_style()
        } else {
            self.theme.dim_style()
        };

        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left.as_str(), left_style),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(right, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left.as_str(), left_style))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Runs a restore step when dropped, on every way out of the event loop
struct RestoreGuard<F: FnOnce()> {
    restore: Option<F>,
}

impl<F: FnOnce()> RestoreGuard<F> {
    fn new(restore: F) -> Self {
        Self {
            restore: Some(restore),
        }
    }
}

impl<F: FnOnce()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

fn restore_terminal() {
    use crossterm::{
        cursor::Show,
        event::{DisableBracketedPaste, DisableMouseCapture},
        execute,
        terminal::{LeaveAlternateScreen, disable_raw_mode},
    };

    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "failed to disable raw mode");
    }
    if let Err(e) = execute!(
        std::io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        Show
    ) {
        tracing::warn!(error = %e, "failed to restore terminal");
    }
}

/// Draw a frame and return the terminal width for input handling
fn redraw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut TuiState,
) -> anyhow::Result<u16> {
    terminal.draw(|frame| state.render(frame))?;
    Ok(terminal.size()?.width)
}

/// Run the TUI application
pub async fn run_tui(
    relay: &mut ChatRelay,
    assistant: &Assistant,
    config: &Config,
    theme: Theme,
) -> anyhow::Result<()> {
    use crossterm::{
        event::{EnableBracketedPaste, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, enable_raw_mode},
    };
    use std::io;

    enable_raw_mode()?;
    let _restore = RestoreGuard::new(restore_terminal);
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);
    let mut state = TuiState::new(
        config.title(),
        config.intro(),
        assistant.display_name(),
        theme,
        ui_tx,
    );

    let mut relay_rx = relay.subscribe();
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    // Set from the ui channel, started at the top of the next iteration
    let mut pending_prompt: Option<String> = None;

    let result: anyhow::Result<()> = 'app: loop {
        if let Some(question) = pending_prompt.take() {
            state.begin_exchange();
            let mut prompt_future = std::pin::pin!(relay.prompt(&question));

            // Poll the exchange alongside input until it completes
            loop {
                let width = match redraw(&mut terminal, &mut state) {
                    Ok(width) => width,
                    Err(e) => break 'app Err(e),
                };

                tokio::select! {
                    biased;

                    event = relay_rx.recv() => {
                        if let Ok(event) = event {
                            state.handle_relay_event(event);
                        }
                    }

                    result = &mut prompt_future => {
                        if let Err(e) = result {
                            tracing::debug!(error = %e, "exchange failed");
                        }
                        break;
                    }

                    event = event_stream.next() => {
                        match event {
                            Some(Ok(Event::Mouse(mouse))) => state.handle_mouse(mouse.kind),
                            Some(Ok(event)) => match event_to_action(event) {
                                Some(Action::Quit | Action::Interrupt | Action::Escape) => {
                                    break 'app Ok(());
                                }
                                Some(
                                    action @ (Action::PageUp | Action::PageDown | Action::Submit),
                                ) => {
                                    state.handle_action(action, width).await;
                                }
                                // Typing continues while the reply streams
                                Some(action) => {
                                    state.input.handle_action(&action, width);
                                }
                                None => {}
                            },
                            Some(Err(e)) => break 'app Err(anyhow::anyhow!("Event error: {}", e)),
                            None => break 'app Ok(()),
                        }
                    }

                    _ = tick_interval.tick() => {}
                }
            }

            // Errors and the final update may still be queued
            while let Ok(event) = relay_rx.try_recv() {
                state.handle_relay_event(event);
            }
            state.end_exchange();
            continue;
        }

        let width = match redraw(&mut terminal, &mut state) {
            Ok(width) => width,
            Err(e) => break Err(e),
        };

        tokio::select! {
            biased;

            event = relay_rx.recv() => {
                if let Ok(event) = event {
                    state.handle_relay_event(event);
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Mouse(mouse))) => state.handle_mouse(mouse.kind),
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !state.handle_action(action, width).await {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => break Err(anyhow::anyhow!("Event error: {}", e)),
                    None => break Ok(()),
                }
            }

            _ = tick_interval.tick() => {}

            msg = ui_rx.recv() => {
                match msg {
                    Some(UiMessage::Submit(question)) => {
                        pending_prompt = Some(question);
                    }
                    Some(UiMessage::Command(cmd)) => {
                        match execute_command(&cmd, relay, assistant) {
                            Some(CommandResult::Message(text)) => state.show_notice(&text),
                            Some(CommandResult::Exit) => break Ok(()),
                            Some(CommandResult::Unknown(cmd)) => state.show_notice(&format!(
                                "Unknown command: /{}\nType /help for available commands.",
                                cmd
                            )),
                            None => pending_prompt = Some(cmd),
                        }
                    }
                    Some(UiMessage::Quit) | None => break Ok(()),
                }
            }
        }
    };

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (TuiState, mpsc::Receiver<UiMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let state = TuiState::new("Title", "Intro", "Knowledge Hub", Theme::dark(), tx);
        (state, rx)
    }

    async fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80).await;
        }
    }

    #[test]
    fn test_reply_lifecycle() {
        let (mut state, _rx) = state();
        state.handle_relay_event(RelayEvent::UserTurn {
            text: "What is Amnesty International?".into(),
        });
        state.handle_relay_event(RelayEvent::ReplyStart);
        assert!(state.is_streaming);

        for text in ["Amnesty ", "Amnesty International is "] {
            state.handle_relay_event(RelayEvent::ReplyUpdate { text: text.into() });
        }
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "Amnesty International is ");
        assert!(state.messages[1].is_streaming);

        state.handle_relay_event(RelayEvent::ReplyEnd {
            text: "Amnesty International is a human rights organization.".into(),
        });
        assert!(!state.is_streaming);
        assert!(!state.messages[1].is_streaming);
        assert_eq!(
            state.messages[1].content,
            "Amnesty International is a human rights organization."
        );
    }

    #[test]
    fn test_error_drops_partial_reply() {
        let (mut state, _rx) = state();
        state.handle_relay_event(RelayEvent::UserTurn { text: "Hi".into() });
        state.handle_relay_event(RelayEvent::ReplyStart);
        state.handle_relay_event(RelayEvent::ReplyUpdate {
            text: "Hel".into(),
        });
        state.handle_relay_event(RelayEvent::Error {
            message: "stream ended unexpectedly".into(),
        });

        assert!(!state.is_streaming);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].kind, hubchat_tui::widgets::MessageKind::Error);
        assert!(state.status.contains("stream ended unexpectedly"));
    }

    #[tokio::test]
    async fn test_submit_routes_questions_and_commands() {
        let (mut state, mut rx) = state();

        type_text(&mut state, "  What is Amnesty?  ").await;
        assert!(state.handle_action(Action::Submit, 80).await);
        assert_eq!(
            rx.try_recv().ok(),
            Some(UiMessage::Submit("What is Amnesty?".into()))
        );

        type_text(&mut state, "/session").await;
        state.handle_action(Action::Submit, 80).await;
        assert_eq!(rx.try_recv().ok(), Some(UiMessage::Command("/session".into())));
    }

    #[tokio::test]
    async fn test_blank_submit_sends_nothing() {
        let (mut state, mut rx) = state();
        type_text(&mut state, "   ").await;
        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_blocked_while_streaming() {
        let (mut state, mut rx) = state();
        state.handle_relay_event(RelayEvent::ReplyStart);

        type_text(&mut state, "next question").await;
        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(state.input.content(), "next question");
    }

    #[tokio::test]
    async fn test_submit_blocked_before_reply_starts() {
        let (mut state, mut rx) = state();
        state.begin_exchange();

        type_text(&mut state, "another").await;
        state.handle_action(Action::Submit, 80).await;
        assert!(rx.try_recv().is_err());

        state.end_exchange();
        assert!(!state.is_streaming);
        state.handle_action(Action::Submit, 80).await;
        assert_eq!(rx.try_recv().ok(), Some(UiMessage::Submit("another".into())));
    }

    #[tokio::test]
    async fn test_quit_keys() {
        for action in [Action::Quit, Action::Interrupt, Action::Escape] {
            let (mut state, mut rx) = state();
            assert!(!state.handle_action(action, 80).await);
            assert_eq!(rx.try_recv().ok(), Some(UiMessage::Quit));
        }
    }

    #[test]
    fn test_restore_runs_on_early_error() {
        use std::cell::Cell;

        fn failing_loop(restored: &Cell<bool>) -> anyhow::Result<()> {
            let _restore = RestoreGuard::new(|| restored.set(true));
            anyhow::bail!("draw failed");
        }

        let restored = Cell::new(false);
        assert!(failing_loop(&restored).is_err());
        assert!(restored.get());
    }

    #[test]
    fn test_restore_runs_once() {
        use std::cell::Cell;

        let count = Cell::new(0);
        {
            let _restore = RestoreGuard::new(|| count.set(count.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }

    #[tokio::test]
    async fn test_page_up_stops_following() {
        let (mut state, _rx) = state();
        state.scroll = 25;
        state.handle_action(Action::PageUp, 80).await;
        assert!(!state.follow);
        assert_eq!(state.scroll, 15);
    }
}
