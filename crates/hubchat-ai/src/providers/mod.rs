//! Assistant service implementations

pub mod openai;

use crate::{AssistantEventStream, Result, Role, ThreadId};
use async_trait::async_trait;

/// Remote assistant operations the chat relay depends on
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Create a new conversation thread and return its handle
    async fn create_conversation(&self) -> Result<ThreadId>;

    /// Append a message to an existing thread
    async fn post_message(&self, thread: &ThreadId, role: Role, text: &str) -> Result<()>;

    /// Start a generation over the thread and stream its events
    async fn stream_generation(&self, thread: &ThreadId) -> Result<AssistantEventStream>;
}
