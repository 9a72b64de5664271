//! Streaming event types and SSE decoding

use crate::error::{Error, Result};
use crate::types::{ApiErrorBody, ApiErrorEnvelope, Role, Run};
use serde::Deserialize;
use std::pin::Pin;
use tokio_stream::Stream;

/// Run lifecycle stage, from the `thread.run.*` event name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEventKind {
    Created,
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Incomplete,
    Failed,
    Cancelling,
    Cancelled,
    Expired,
}

impl RunEventKind {
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "created" => Self::Created,
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "failed" => Self::Failed,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "expired" => Self::Expired,
            _ => return None,
        })
    }
}

/// Message lifecycle stage, from the `thread.message.*` event name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEventKind {
    Created,
    InProgress,
    Completed,
    Incomplete,
}

impl MessageEventKind {
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "created" => Self::Created,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            _ => return None,
        })
    }
}

/// Events received while a run streams
#[derive(Debug, Clone)]
pub enum AssistantStreamEvent {
    /// A thread was created (only when the run creates one)
    ThreadCreated,
    /// Run lifecycle change
    Run { kind: RunEventKind, run: Run },
    /// Run step lifecycle change (`thread.run.step.*`)
    RunStep { kind: String },
    /// Message lifecycle change
    Message {
        kind: MessageEventKind,
        message_id: String,
    },
    /// Incremental message content
    MessageDelta(MessageDelta),
    /// End of stream marker
    Done,
    /// Event name this client does not know about
    Unknown { event: String },
}

impl AssistantStreamEvent {
    /// Decode one server-sent event.
    ///
    /// `error` events are returned as `Err`. Unrecognized event names are
    /// not an error; they decode to [`AssistantStreamEvent::Unknown`].
    pub fn from_sse(event: &str, data: &str) -> Result<Self> {
        match event {
            "done" => return Ok(Self::Done),
            "error" => return Err(error_from_event_data(data)),
            "thread.created" => return Ok(Self::ThreadCreated),
            "thread.message.delta" => {
                return Ok(Self::MessageDelta(serde_json::from_str(data)?));
            }
            _ => {}
        }

        if let Some(suffix) = event.strip_prefix("thread.run.step.") {
            return Ok(Self::RunStep {
                kind: suffix.to_string(),
            });
        }

        if let Some(kind) = event
            .strip_prefix("thread.run.")
            .and_then(RunEventKind::from_suffix)
        {
            let run: Run = serde_json::from_str(data)?;
            return Ok(Self::Run { kind, run });
        }

        if let Some(kind) = event
            .strip_prefix("thread.message.")
            .and_then(MessageEventKind::from_suffix)
        {
            let message: MessageRef = serde_json::from_str(data)?;
            return Ok(Self::Message {
                kind,
                message_id: message.id,
            });
        }

        Ok(Self::Unknown {
            event: event.to_string(),
        })
    }

    /// Text fragment carried by this event, if it is an assistant text delta
    pub fn text_fragment(&self) -> Option<String> {
        match self {
            Self::MessageDelta(delta) => delta.text_fragment(),
            _ => None,
        }
    }
}

/// A stream of decoded run events
pub type AssistantEventStream = Pin<Box<dyn Stream<Item = Result<AssistantStreamEvent>> + Send>>;

/// Payload of a `thread.message.delta` event
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    pub id: String,
    pub delta: DeltaContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeltaContent {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Vec<DeltaBlock>,
}

/// One content block of a message delta
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaBlock {
    Text {
        index: u32,
        #[serde(default)]
        text: Option<TextDelta>,
    },
    ImageFile {
        index: u32,
    },
    ImageUrl {
        index: u32,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDelta {
    #[serde(default)]
    pub value: Option<String>,
}

impl MessageDelta {
    /// Concatenated text of all text blocks, in block index order.
    ///
    /// Returns `None` when the delta carries no text (image blocks only, or
    /// a delta for a non-assistant message).
    pub fn text_fragment(&self) -> Option<String> {
        if self.delta.role == Some(Role::User) {
            return None;
        }

        let mut parts: Vec<(u32, &str)> = self
            .delta
            .content
            .iter()
            .filter_map(|block| match block {
                DeltaBlock::Text {
                    index,
                    text: Some(TextDelta { value: Some(value) }),
                } => Some((*index, value.as_str())),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            return None;
        }

        parts.sort_by_key(|(index, _)| *index);
        Some(parts.into_iter().map(|(_, text)| text).collect())
    }
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

fn error_from_event_data(data: &str) -> Error {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(data) {
        return body_to_error(envelope.error);
    }
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(data) {
        return body_to_error(body);
    }
    Error::api("stream_error", data.trim())
}

fn body_to_error(body: ApiErrorBody) -> Error {
    let error_type = body
        .error_type
        .or(body.code)
        .unwrap_or_else(|| "stream_error".to_string());
    Error::api(error_type, body.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunStatus;

    fn delta_json(blocks: &str) -> String {
        format!(
            r#"{{"id":"msg_1","object":"thread.message.delta","delta":{{"content":[{}]}}}}"#,
            blocks
        )
    }

    #[test]
    fn test_text_delta() {
        let data = delta_json(r#"{"index":0,"type":"text","text":{"value":"Amnesty ","annotations":[]}}"#);
        let event = AssistantStreamEvent::from_sse("thread.message.delta", &data).unwrap();
        assert_eq!(event.text_fragment().as_deref(), Some("Amnesty "));
    }

    #[test]
    fn test_text_blocks_joined_in_index_order() {
        let data = delta_json(
            r#"{"index":1,"type":"text","text":{"value":"world"}},{"index":0,"type":"text","text":{"value":"hello "}}"#,
        );
        let event = AssistantStreamEvent::from_sse("thread.message.delta", &data).unwrap();
        assert_eq!(event.text_fragment().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_image_delta_has_no_text() {
        let data = delta_json(r#"{"index":0,"type":"image_file","image_file":{"file_id":"file_1"}}"#);
        let event = AssistantStreamEvent::from_sse("thread.message.delta", &data).unwrap();
        assert!(matches!(event, AssistantStreamEvent::MessageDelta(_)));
        assert_eq!(event.text_fragment(), None);
    }

    #[test]
    fn test_unknown_block_type_is_tolerated() {
        let data = delta_json(r#"{"index":0,"type":"refusal","refusal":"no"}"#);
        let event = AssistantStreamEvent::from_sse("thread.message.delta", &data).unwrap();
        assert_eq!(event.text_fragment(), None);
    }

    #[test]
    fn test_user_delta_is_not_a_reply_fragment() {
        let data = r#"{"id":"msg_1","delta":{"role":"user","content":[{"index":0,"type":"text","text":{"value":"hi"}}]}}"#;
        let event = AssistantStreamEvent::from_sse("thread.message.delta", data).unwrap();
        assert_eq!(event.text_fragment(), None);
    }

    #[test]
    fn test_run_lifecycle_events() {
        let data = r#"{"id":"run_1","object":"thread.run","status":"in_progress"}"#;
        match AssistantStreamEvent::from_sse("thread.run.in_progress", data).unwrap() {
            AssistantStreamEvent::Run { kind, run } => {
                assert_eq!(kind, RunEventKind::InProgress);
                assert_eq!(run.status, RunStatus::InProgress);
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_run_step_event() {
        let data = r#"{"id":"step_1","object":"thread.run.step"}"#;
        match AssistantStreamEvent::from_sse("thread.run.step.delta", data).unwrap() {
            AssistantStreamEvent::RunStep { kind } => assert_eq!(kind, "delta"),
            other => panic!("expected RunStep, got {:?}", other),
        }
    }

    #[test]
    fn test_message_lifecycle_event() {
        let data = r#"{"id":"msg_9","object":"thread.message","status":"completed"}"#;
        match AssistantStreamEvent::from_sse("thread.message.completed", data).unwrap() {
            AssistantStreamEvent::Message { kind, message_id } => {
                assert_eq!(kind, MessageEventKind::Completed);
                assert_eq!(message_id, "msg_9");
            }
            other => panic!("expected Message, got {:?}", other),
        }
        assert!(
            AssistantStreamEvent::from_sse("thread.message.completed", data)
                .unwrap()
                .text_fragment()
                .is_none()
        );
    }

    #[test]
    fn test_done_event() {
        let event = AssistantStreamEvent::from_sse("done", "[DONE]").unwrap();
        assert!(matches!(event, AssistantStreamEvent::Done));
    }

    #[test]
    fn test_unknown_event_name() {
        match AssistantStreamEvent::from_sse("thread.run.something_new", "{}").unwrap() {
            AssistantStreamEvent::Unknown { event } => assert_eq!(event, "thread.run.something_new"),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_error_event() {
        let data = r#"{"code":"server_error","message":"Sorry, something went wrong."}"#;
        match AssistantStreamEvent::from_sse("error", data) {
            Err(Error::Api {
                error_type,
                message,
            }) => {
                assert_eq!(error_type, "server_error");
                assert_eq!(message, "Sorry, something went wrong.");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_delta_is_an_error() {
        let result = AssistantStreamEvent::from_sse("thread.message.delta", "{not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
