//! Message list widget for displaying the chat transcript

use crate::theme::Theme;
use crate::widgets::markdown::{render_markdown, wrap_line};
use crate::widgets::spinner::frame_at;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::time::Instant;

/// What kind of entry a [`ChatMessage`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
    /// Local output such as slash command results
    Notice,
    Error,
}

/// A single entry in the chat view
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    /// Set on the assistant entry while its reply is still arriving
    pub is_streaming: bool,
}

impl ChatMessage {
    fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            is_streaming: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    /// An assistant entry whose text is replaced as the reply grows
    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        Self {
            is_streaming: true,
            ..Self::assistant(content)
        }
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Notice, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, content)
    }
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    assistant_label: &'a str,
    scroll: usize,
    started: Option<Instant>,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            assistant_label: "Assistant",
            scroll: 0,
            started: None,
        }
    }

    /// Label shown above assistant replies
    pub fn assistant_label(mut self, label: &'a str) -> Self {
        self.assistant_label = label;
        self
    }

    /// Number of lines scrolled off the top
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Start of the current stream, used to animate the thinking indicator
    pub fn stream_started(mut self, started: Option<Instant>) -> Self {
        self.started = started;
        self
    }

    /// All lines of the transcript, wrapped to `width`
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        self.messages
            .iter()
            .flat_map(|msg| self.render_message(msg, width))
            .collect()
    }

    fn render_message(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let theme = self.theme;
        let (label, label_style, prefix) = match msg.kind {
            MessageKind::User => ("You", theme.user_style(), "▶ "),
            MessageKind::Assistant => (self.assistant_label, theme.assistant_style(), "◀ "),
            MessageKind::Notice => ("hubchat", theme.dim_style(), "● "),
            MessageKind::Error => ("Error", theme.error_style().add_modifier(Modifier::BOLD), "✗ "),
        };
        let header = if msg.is_streaming {
            format!("{}{} ▌", prefix, label)
        } else {
            format!("{}{}", prefix, label)
        };

        let mut lines = wrap_line(Line::from(Span::styled(header, label_style)), width);
        let content_width = width.saturating_sub(2).max(1);

        let body: Vec<Line<'static>> = match msg.kind {
            MessageKind::Assistant if msg.content.is_empty() && msg.is_streaming => {
                let frame = frame_at(self.started.map(|s| s.elapsed()).unwrap_or_default());
                vec![Line::from(Span::styled(
                    format!("{} thinking...", frame),
                    theme.accent_style(),
                ))]
            }
            MessageKind::Assistant => render_markdown(&msg.content, theme, content_width)
                .into_iter()
                .flat_map(|line| wrap_line(line, content_width))
                .collect(),
            _ => {
                let style = match msg.kind {
                    MessageKind::Error => theme.error_style(),
                    MessageKind::Notice => theme.dim_style(),
                    _ => theme.base_style(),
                };
                textwrap::wrap(&msg.content, content_width)
                    .into_iter()
                    .map(|line| Line::from(Span::styled(line.into_owned(), style)))
                    .collect()
            }
        };

        lines.extend(body.into_iter().map(|line| {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans);
            Line::from(spans)
        }));
        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Lines are pre-wrapped, so one line is exactly one row.
        let visible: Vec<Line> = self
            .lines(area.width as usize)
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of `messages` at `width`
pub fn calculate_message_height(messages: &[ChatMessage], width: usize) -> usize {
    let theme = Theme::default();
    MessageList::new(messages, &theme).lines(width).len()
}
