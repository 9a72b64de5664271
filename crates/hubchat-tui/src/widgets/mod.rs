//! Custom widgets for the chat screen

pub mod header;
pub mod input_box;
pub mod markdown;
pub mod message_list;
pub mod spinner;

pub use header::Header;
pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageKind, MessageList};
pub use spinner::Spinner;
