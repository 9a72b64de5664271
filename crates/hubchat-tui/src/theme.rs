//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the chat screen
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (title, headings, focused input)
    pub accent: Color,
    /// Color of the "You" label
    pub user: Color,
    /// Color of the assistant label
    pub assistant: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// Code/preformatted text color
    pub code: Color,
    /// Link color
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            fg: Color::Reset,
            dim: Color::DarkGray,
            accent: Color::Yellow,
            user: Color::Cyan,
            assistant: Color::Green,
            error: Color::Red,
            border: Color::DarkGray,
            code: Color::Magenta,
            link: Color::Blue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Rgb(180, 120, 0),
            user: Color::Blue,
            assistant: Color::Rgb(0, 120, 0),
            error: Color::Red,
            border: Color::Gray,
            code: Color::Magenta,
            link: Color::Blue,
        }
    }

    /// Look a theme up by name; unknown names give the dark theme
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }

    pub fn user_style(&self) -> Style {
        Style::default().fg(self.user).add_modifier(Modifier::BOLD)
    }

    pub fn assistant_style(&self) -> Style {
        Style::default()
            .fg(self.assistant)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}
