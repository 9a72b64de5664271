//! Per-session state: transcript, conversation handle, and reply buffer.

use chrono::{DateTime, Local, Utc};
use hubchat_ai::{Role, ThreadId};
use serde::{Deserialize, Serialize};

/// One entry of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Turn {
    /// Create a user turn stamped now
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant turn stamped now
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// When the turn was recorded, in local time
    pub fn local_time(&self) -> Option<DateTime<Local>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp).map(|t| t.with_timezone(&Local))
    }
}

/// Append-only, ordered record of the session's turns
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn first(&self) -> Option<&Turn> {
        self.turns.first()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns by the given role
    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// No remote conversation yet
    NoConversation,
    /// Conversation exists, waiting for input
    Idle,
    /// A reply is streaming
    Streaming,
}

/// Session state owned by one relay.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) transcript: Transcript,
    pub(crate) thread_id: Option<ThreadId>,
    /// Reply buffer of the in-flight stream; `None` when no stream is open
    pub(crate) reply: Option<String>,
}

impl Session {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub fn state(&self) -> RelayState {
        match (&self.thread_id, &self.reply) {
            (None, _) => RelayState::NoConversation,
            (Some(_), None) => RelayState::Idle,
            (Some(_), Some(_)) => RelayState::Streaming,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.reply.is_some()
    }
}
