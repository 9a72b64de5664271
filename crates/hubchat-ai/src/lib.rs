//! hubchat-ai: Assistant service client
//!
//! This crate talks to a hosted assistant API: it creates conversation
//! threads, posts user messages to them, and streams run output back as
//! typed events.

pub mod error;
pub mod providers;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use providers::AssistantService;
pub use providers::openai::AssistantsClient;
pub use stream::{AssistantEventStream, AssistantStreamEvent, MessageDelta};
pub use types::*;
