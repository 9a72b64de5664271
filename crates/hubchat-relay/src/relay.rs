//! Chat relay: submit, stream consumption, and completion

use std::sync::Arc;

use futures::StreamExt;
use hubchat_ai::{
    AssistantEventStream, AssistantService, AssistantStreamEvent, Role, ThreadId,
    stream::RunEventKind,
};
use tokio::sync::broadcast;

use crate::{
    error::{Error, Result},
    events::RelayEvent,
    session::{RelayState, Session, Transcript, Turn},
};

/// Relays one session's conversation to the assistant service
pub struct ChatRelay {
    service: Arc<dyn AssistantService>,
    session: Session,
    event_tx: broadcast::Sender<RelayEvent>,
}

impl ChatRelay {
    /// Create a relay with a fresh session
    pub fn new(service: Arc<dyn AssistantService>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            service,
            session: Session::default(),
            event_tx,
        }
    }

    /// Subscribe to relay events
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.event_tx.subscribe()
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.session.thread_id()
    }

    pub fn state(&self) -> RelayState {
        self.session.state()
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_streaming()
    }

    /// Current reply buffer, while a stream is open
    pub fn reply_text(&self) -> Option<&str> {
        self.session.reply()
    }

    /// Submit user input and open the reply stream.
    ///
    /// Returns `Ok(None)` for blank input without touching the transcript or
    /// the service. Other input is stored and posted exactly as typed. On
    /// success the user turn is already in the transcript and the relay is
    /// `Streaming`; feed the returned stream to
    /// [`on_stream_event`](Self::on_stream_event) and finish with
    /// [`on_stream_complete`](Self::on_stream_complete), or with
    /// [`on_stream_error`](Self::on_stream_error) if the stream fails.
    pub async fn submit(&mut self, text: &str) -> Result<Option<AssistantEventStream>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.session.is_streaming() {
            return Err(Error::Busy);
        }

        let thread = match self.ensure_conversation().await {
            Ok(thread) => thread,
            Err(e) => {
                self.emit(RelayEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.session.transcript.push(Turn::user(text));
        self.emit(RelayEvent::UserTurn {
            text: text.to_string(),
        });

        let opened = match self.service.post_message(&thread, Role::User, text).await {
            Ok(()) => self.service.stream_generation(&thread).await,
            Err(e) => Err(e),
        };

        match opened {
            Ok(stream) => {
                self.session.reply = Some(String::new());
                self.emit(RelayEvent::ReplyStart);
                Ok(Some(stream))
            }
            Err(e) => {
                self.emit(RelayEvent::Error {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Apply one stream event. Returns `true` if it grew the reply buffer.
    ///
    /// Only assistant text deltas count; everything else is ignored.
    pub fn on_stream_event(&mut self, event: &AssistantStreamEvent) -> bool {
        if let AssistantStreamEvent::Run {
            kind: RunEventKind::Failed,
            run,
        } = event
        {
            let reason = run
                .last_error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("no reason given");
            tracing::warn!(run_id = %run.id, reason, "run failed");
        }

        let Some(fragment) = event.text_fragment() else {
            return false;
        };

        let Some(reply) = self.session.reply.as_mut() else {
            tracing::warn!("text delta received with no reply streaming");
            return false;
        };

        reply.push_str(&fragment);
        let text = reply.clone();
        self.emit(RelayEvent::ReplyUpdate { text });
        true
    }

    /// Freeze the reply buffer into an assistant turn
    pub fn on_stream_complete(&mut self) -> Result<&Turn> {
        let text = self.session.reply.take().ok_or(Error::NotStreaming)?;

        self.session.transcript.push(Turn::assistant(text.clone()));
        self.emit(RelayEvent::ReplyEnd { text });

        self.session.transcript.last().ok_or(Error::NotStreaming)
    }

    /// End the exchange after the stream failed.
    ///
    /// The partial reply is dropped, no assistant turn is recorded, and the
    /// relay goes back to `Idle`. Returns `NotStreaming` if no stream is open.
    pub fn on_stream_error(&mut self, error: &hubchat_ai::Error) -> Result<()> {
        let partial = self.session.reply.take().ok_or(Error::NotStreaming)?;
        tracing::debug!(
            chars = partial.chars().count(),
            error = %error,
            "discarding partial reply"
        );
        self.emit(RelayEvent::Error {
            message: error.to_string(),
        });
        Ok(())
    }

    /// Run one full exchange: submit, consume the stream, complete.
    ///
    /// Returns `Ok(false)` for blank input. A stream error drops the partial
    /// reply, leaves no assistant turn, and returns the relay to idle.
    pub async fn prompt(&mut self, user_text: &str) -> Result<bool> {
        let Some(mut stream) = self.submit(user_text).await? else {
            return Ok(false);
        };

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    self.on_stream_event(&event);
                }
                Err(e) => {
                    self.on_stream_error(&e)?;
                    return Err(e.into());
                }
            }
        }

        self.on_stream_complete()?;
        Ok(true)
    }

    async fn ensure_conversation(&mut self) -> Result<ThreadId> {
        if let Some(thread) = &self.session.thread_id {
            return Ok(thread.clone());
        }

        let thread = self.service.create_conversation().await?;
        tracing::debug!(thread_id = %thread, "conversation started");
        self.session.thread_id = Some(thread.clone());
        self.emit(RelayEvent::ConversationStarted {
            thread_id: thread.clone(),
        });
        Ok(thread)
    }

    fn emit(&self, event: RelayEvent) {
        let _ = self.event_tx.send(event);
    }
}
