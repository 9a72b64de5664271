//! Relay event types

use hubchat_ai::ThreadId;
use serde::{Deserialize, Serialize};

/// Events emitted to the display while a session runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// The remote conversation was created (once per session)
    ConversationStarted { thread_id: ThreadId },

    /// A user turn was appended to the transcript
    UserTurn { text: String },

    /// The reply stream opened; the live region should appear empty
    ReplyStart,

    /// The reply buffer grew. `text` is the full buffer, not the delta.
    ReplyUpdate { text: String },

    /// The reply was appended to the transcript
    ReplyEnd { text: String },

    /// The exchange failed
    Error { message: String },
}
