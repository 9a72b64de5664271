//! Page header: title line and optional intro text

use crate::theme::Theme;
use crate::widgets::markdown::{render_markdown, wrap_line};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Title with an intro rendered as markdown beneath it.
///
/// The intro is meant for an empty chat; callers drop it with
/// [`Header::intro`]`(None)` once the conversation starts.
pub struct Header<'a> {
    title: &'a str,
    intro: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            intro: None,
            theme,
        }
    }

    pub fn intro(mut self, intro: Option<&'a str>) -> Self {
        self.intro = intro.filter(|text| !text.trim().is_empty());
        self
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = wrap_line(
            Line::from(Span::styled(self.title.to_string(), self.theme.accent_bold())),
            width,
        );
        if let Some(intro) = self.intro {
            lines.push(Line::from(""));
            for line in render_markdown(intro, self.theme, width) {
                lines.extend(wrap_line(line, width));
            }
        }
        lines
    }

    /// Rows needed to show the whole header at `width`, bottom border included
    pub fn height(&self, width: u16) -> u16 {
        let rows = self.lines(width.max(1) as usize).len() + 1;
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        Paragraph::new(self.lines(inner.width as usize)).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_with_and_without_intro() {
        let theme = Theme::dark();
        let header = Header::new("Knowledge Hub", &theme);
        assert_eq!(header.height(80), 2);

        let header = header.intro(Some("Welcome.\n\n- one\n- two\n"));
        // title, blank, paragraph, blank, two items, border
        assert_eq!(header.height(80), 7);
    }

    #[test]
    fn test_blank_intro_is_dropped() {
        let theme = Theme::dark();
        let header = Header::new("Knowledge Hub", &theme).intro(Some("  \n"));
        assert_eq!(header.height(80), 2);
    }

    #[test]
    fn test_long_title_wraps() {
        let theme = Theme::dark();
        let header = Header::new(
            "GenAI Chat PoC: Intelligent Knowledge Retrieval for Amnesty’s Knowledge Hub",
            &theme,
        );
        assert!(header.height(30) > 2);
    }
}
