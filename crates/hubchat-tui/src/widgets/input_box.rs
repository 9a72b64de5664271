//! Single-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    /// Cursor position in chars, not bytes
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    placeholder: String,
    focused: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Take the entered text for submission.
    ///
    /// Returns `None` and leaves the box untouched when it holds only
    /// whitespace; otherwise clears the box and returns the trimmed text.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.content.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.clear();
        Some(text)
    }

    /// Apply an editing action. Returns whether it was handled.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let len = self.char_len();
        let handled = match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        // \r\n must not produce two spaces
                        if self.cursor > 0 && !self.char_before_cursor_is(' ') {
                            self.insert(' ');
                        }
                    } else {
                        self.insert(c);
                    }
                }
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_range(self.cursor, self.cursor + 1);
                true
            }
            Action::Delete if self.cursor < len => {
                self.remove_range(self.cursor, self.cursor + 1);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < len => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = len;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let start = self.word_start_before_cursor();
                self.remove_range(start, self.cursor);
                self.cursor = start;
                true
            }
            _ => false,
        };

        if handled {
            self.update_scroll(width as usize);
        }
        handled
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

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_text(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.focused && inner.width > 0 {
            let cursor_x = self.cursor_column().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let x = inner.x + cursor_x as u16;
                if let Some(cell) = buf.cell_mut((x, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        let (start, end) = (self.byte_index(start), self.byte_index(end));
        self.content.drain(start..end);
    }

    fn char_before_cursor_is(&self, expected: char) -> bool {
        self.cursor > 0 && self.content.chars().nth(self.cursor - 1) == Some(expected)
    }

    fn word_start_before_cursor(&self) -> usize {
        let chars: Vec<char> = self.content.chars().take(self.cursor).collect();
        let mut i = chars.len();
        while i > 0 && chars[i - 1] == ' ' {
            i -= 1;
        }
        while i > 0 && chars[i - 1] != ' ' {
            i -= 1;
        }
        i
    }

    fn cursor_column(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn update_scroll(&mut self, width: usize) {
        // two columns of border plus one for the cursor cell
        let visible = width.saturating_sub(3).max(1);
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    fn visible_text(&self, width: usize) -> String {
        let mut skipped = 0;
        let mut used = 0;
        let mut out = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out
    }
}
