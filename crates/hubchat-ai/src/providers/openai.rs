//! OpenAI Assistants API (v2) client

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::{Error, Result},
    providers::AssistantService,
    stream::{AssistantEventStream, AssistantStreamEvent},
    types::{Assistant, Role, ThreadId},
};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Assistants API client bound to one assistant
pub struct AssistantsClient {
    client: reqwest::Client,
    api_key: String,
    assistant_id: String,
    base_url: String,
}

impl AssistantsClient {
    /// Create a new client for the given key and assistant
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (proxies, compatible servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The assistant this client runs
    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// Fetch the configured assistant. Fails if the key or id is wrong.
    pub async fn retrieve_assistant(&self) -> Result<Assistant> {
        let url = self.url(&format!("/assistants/{}", self.assistant_id));
        tracing::debug!(%url, "retrieving assistant");
        let request = self.client.get(&url).headers(self.headers()?);
        self.send_json(request).await
    }

    /// Create an empty thread
    pub async fn create_thread(&self) -> Result<ThreadId> {
        let url = self.url("/threads");
        let request = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&serde_json::json!({}));
        let thread: ThreadObject = self.send_json(request).await?;
        tracing::debug!(thread_id = %thread.id, "created thread");
        Ok(thread.id)
    }

    /// Add a message to a thread
    pub async fn create_message(&self, thread: &ThreadId, role: Role, text: &str) -> Result<()> {
        let url = self.url(&format!("/threads/{}/messages", thread));
        let body = CreateMessageRequest {
            role,
            content: text,
        };
        let request = self.client.post(&url).headers(self.headers()?).json(&body);
        let message: MessageObject = self.send_json(request).await?;
        tracing::debug!(thread_id = %thread, message_id = %message.id, "posted message");
        Ok(())
    }

    /// Start a run on a thread and stream its events
    pub async fn stream_run(&self, thread: &ThreadId) -> Result<AssistantEventStream> {
        let url = self.url(&format!("/threads/{}/runs", thread));
        let body = CreateRunRequest {
            assistant_id: &self.assistant_id,
            stream: true,
        };
        let request_builder = self.client.post(&url).headers(self.headers()?).json(&body);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        tracing::debug!(thread_id = %thread, "streaming run");
        Ok(Box::pin(create_stream(event_source)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::InvalidApiKey)?;
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert("openai-beta", HeaderValue::from_static("assistants=v2"));
        Ok(headers)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::from_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::UnexpectedResponse(format!("{} in response body: {}", e, truncate(&text, 200)))
        })
    }
}

#[async_trait]
impl AssistantService for AssistantsClient {
    async fn create_conversation(&self) -> Result<ThreadId> {
        self.create_thread().await
    }

    async fn post_message(&self, thread: &ThreadId, role: Role, text: &str) -> Result<()> {
        self.create_message(thread, role, text).await
    }

    async fn stream_generation(&self, thread: &ThreadId) -> Result<AssistantEventStream> {
        self.stream_run(thread).await
    }
}

fn create_stream(
    mut event_source: EventSource,
) -> impl futures::Stream<Item = Result<AssistantStreamEvent>> {
    stream! {
        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {
                    tracing::debug!("run stream opened");
                }
                Ok(Event::Message(msg)) => {
                    match AssistantStreamEvent::from_sse(&msg.event, &msg.data) {
                        Ok(AssistantStreamEvent::Done) => {
                            yield Ok(AssistantStreamEvent::Done);
                            break;
                        }
                        Ok(event) => yield Ok(event),
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let body = response.text().await.unwrap_or_default();
                    yield Err(Error::from_response(status.as_u16(), &body));
                    break;
                }
                Err(e) => {
                    yield Err(Error::Sse(e.to_string()));
                    break;
                }
            }
        }

        // The event source reconnects on its own unless closed.
        event_source.close();
    }
}

fn truncate(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: ThreadId,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AssistantsClient::new("sk-test", "asst_1").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.url("/threads"), "http://localhost:8080/v1/threads");
    }

    #[test]
    fn test_headers() {
        let client = AssistantsClient::new("sk-test", "asst_1");
        let headers = client.headers().unwrap();
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(headers["openai-beta"], "assistants=v2");
    }

    #[test]
    fn test_header_rejects_bad_key() {
        let client = AssistantsClient::new("sk-bad\nkey", "asst_1");
        assert!(matches!(client.headers(), Err(Error::InvalidApiKey)));
    }

    #[test]
    fn test_message_request_body() {
        let body = CreateMessageRequest {
            role: Role::User,
            content: "What is Amnesty International?",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"role": "user", "content": "What is Amnesty International?"})
        );
    }

    #[test]
    fn test_run_request_body() {
        let body = CreateRunRequest {
            assistant_id: "asst_1",
            stream: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"assistant_id": "asst_1", "stream": true})
        );
    }

    #[test]
    fn test_thread_object() {
        let thread: ThreadObject =
            serde_json::from_str(r#"{"id":"thread_abc","object":"thread","created_at":1}"#).unwrap();
        assert_eq!(thread.id.as_str(), "thread_abc");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
