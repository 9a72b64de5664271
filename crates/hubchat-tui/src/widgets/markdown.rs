//! Markdown rendering for terminal UI

use crate::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Convert markdown text to styled lines.
///
/// `width` only limits code block lines, which are truncated rather than
/// wrapped; prose is wrapped by the paragraph that displays the lines.
pub fn render_markdown(text: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut styles: Vec<Style> = vec![theme.base_style()];
    let mut code_block: Option<String> = None;
    // One entry per open list: next number for ordered lists, None for bullets
    let mut lists: Vec<Option<u64>> = Vec::new();

    fn flush(lines: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>) {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    }

    for event in Parser::new(text) {
        let style = *styles.last().unwrap_or(&Style::default());
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    flush(&mut lines, &mut current);
                    let heading = match level {
                        HeadingLevel::H1 => theme
                            .accent_bold()
                            .add_modifier(Modifier::UNDERLINED),
                        HeadingLevel::H2 | HeadingLevel::H3 => theme.accent_bold(),
                        _ => theme.accent_style(),
                    };
                    styles.push(heading);
                }
                Tag::Paragraph => flush(&mut lines, &mut current),
                Tag::CodeBlock(_) => {
                    flush(&mut lines, &mut current);
                    code_block = Some(String::new());
                }
                Tag::List(start) => {
                    flush(&mut lines, &mut current);
                    lists.push(start);
                }
                Tag::Item => {
                    flush(&mut lines, &mut current);
                    let indent = "  ".repeat(lists.len().saturating_sub(1));
                    let marker = match lists.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{}{}. ", indent, n);
                            *n += 1;
                            marker
                        }
                        _ => format!("{}• ", indent),
                    };
                    current.push(Span::styled(marker, theme.dim_style()));
                }
                Tag::Emphasis => styles.push(style.add_modifier(Modifier::ITALIC)),
                Tag::Strong => styles.push(style.add_modifier(Modifier::BOLD)),
                Tag::Strikethrough => styles.push(style.add_modifier(Modifier::CROSSED_OUT)),
                Tag::Link { .. } => styles.push(
                    Style::default()
                        .fg(theme.link)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Heading(_) => {
                    flush(&mut lines, &mut current);
                    styles.pop();
                    lines.push(Line::from(""));
                }
                TagEnd::Paragraph => {
                    flush(&mut lines, &mut current);
                    if lists.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::CodeBlock => {
                    let code = code_block.take().unwrap_or_default();
                    let max = width.saturating_sub(4);
                    for code_line in code.lines() {
                        let shown = if code_line.chars().count() > max {
                            let head: String = code_line.chars().take(max.saturating_sub(1)).collect();
                            format!("  {}…", head)
                        } else {
                            format!("  {}", code_line)
                        };
                        lines.push(Line::from(Span::styled(
                            shown,
                            theme.code_style().add_modifier(Modifier::DIM),
                        )));
                    }
                    lines.push(Line::from(""));
                }
                TagEnd::List(_) => {
                    flush(&mut lines, &mut current);
                    lists.pop();
                    if lists.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::Item => flush(&mut lines, &mut current),
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    if styles.len() > 1 {
                        styles.pop();
                    }
                }
                _ => {}
            },
            Event::Text(text) => match code_block.as_mut() {
                Some(code) => code.push_str(&text),
                None => current.push(Span::styled(text.into_string(), style)),
            },
            Event::Code(code) => {
                current.push(Span::styled(
                    format!("`{}`", code),
                    theme.code_style().add_modifier(Modifier::BOLD),
                ));
            }
            Event::SoftBreak => current.push(Span::styled(" ", style)),
            Event::HardBreak => flush(&mut lines, &mut current),
            _ => {}
        }
    }

    flush(&mut lines, &mut current);

    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }

    lines
}

/// Word-wrap a styled line to `width` columns.
///
/// Breaks between words where possible and inside a word only when the word
/// alone is wider than a line. Whitespace at a break is dropped. A character
/// wider than the whole line (a CJK character at width 1) is shown as `…`.
/// Every returned line is at most `width` columns wide.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut out: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in line.spans {
        let style = span.style;
        for token in split_words(&span.content) {
            let blank = token.chars().all(char::is_whitespace);
            let w = token.width();

            if blank && used == 0 && !out.is_empty() {
                continue;
            }
            if used + w <= width {
                current.push(Span::styled(token.to_string(), style));
                used += w;
                continue;
            }
            if used > 0 {
                out.push(finish_line(&mut current));
                used = 0;
            }
            if blank {
                continue;
            }
            if w <= width {
                current.push(Span::styled(token.to_string(), style));
                used = w;
                continue;
            }

            let mut chunk = String::new();
            for c in token.chars() {
                let (c, cw) = match c.width().unwrap_or(0) {
                    cw if cw > width => ('…', 1),
                    cw => (c, cw),
                };
                if used + cw > width && used > 0 {
                    current.push(Span::styled(std::mem::take(&mut chunk), style));
                    out.push(Line::from(std::mem::take(&mut current)));
                    used = 0;
                }
                chunk.push(c);
                used += cw;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, style));
            }
        }
    }

    if !current.is_empty() || out.is_empty() {
        out.push(Line::from(current));
    }
    out
}

fn finish_line(current: &mut Vec<Span<'static>>) -> Line<'static> {
    while current
        .last()
        .is_some_and(|s| s.content.chars().all(char::is_whitespace))
    {
        current.pop();
    }
    Line::from(std::mem::take(current))
}

/// Split into alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let ws = c.is_whitespace();
        if prev.is_some_and(|p| p != ws) {
            words.push(&text[start..i]);
            start = i;
        }
        prev = Some(ws);
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}
