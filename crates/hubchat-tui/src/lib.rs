//! hubchat-tui: Terminal UI components
//!
//! Widgets for a chat screen built on ratatui and crossterm: a header with
//! title and intro text, a scrolling transcript, a status spinner, and a
//! single-line input box.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
