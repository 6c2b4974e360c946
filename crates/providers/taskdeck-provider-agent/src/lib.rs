//! Agent backend integration for Taskdeck

#![warn(missing_docs)]
#![warn(clippy::all)]

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use taskdeck_core::{decode_stream, EventRouter, Result, TaskdeckError};
use uuid::Uuid;

/// Shared HTTP client for connection pooling
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or initialize the shared HTTP client
fn get_http_client() -> Client {
    HTTP_CLIENT
        .get_or_init(|| {
            Client::builder()
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(std::time::Duration::from_secs(300))
                .tcp_keepalive(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client")
        })
        .clone()
}

/// Chat turn request body
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// User message text
    pub message: String,
    /// Client session identifier
    pub session_id: String,
}

/// Agent backend API client
///
/// One client per conversation; a v4 session id is minted at construction
/// and sent with every turn.
pub struct AgentClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl AgentClient {
    /// Create a client for the backend at `base_url` with a fresh session
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: get_http_client(),
            base_url: base_url.into(),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Session id sent with every chat turn
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send one chat turn and stream the response through `router`
    ///
    /// Every decoded event is routed; `MESSAGE` fragments are additionally
    /// assembled into the returned reply text. Dropping or aborting the
    /// returned future aborts the underlying request, which is how a turn
    /// is cancelled.
    pub async fn send_chat(&self, message: &str, router: &mut EventRouter) -> Result<String> {
        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
        };

        let resp = self
            .client
            .post(format!("{}/chat", self.base_url))
            .header("accept", "text/event-stream")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(TaskdeckError::provider(format!(
                "Agent backend error ({}): {}",
                status, error_text
            )));
        }

        let mut reply = String::new();
        decode_stream(Box::pin(resp.bytes_stream()), |event| {
            router.route(&event);
            if let Some(content) = message_content(&event) {
                reply.push_str(content);
            } else if event_type(&event) == Some("ERROR") {
                tracing::warn!(
                    "Agent backend reported an error event: {}",
                    event.get("content").and_then(|v| v.as_str()).unwrap_or("?")
                );
            }
        })
        .await?;

        Ok(reply)
    }
}

fn event_type(event: &Value) -> Option<&str> {
    event.get("type").and_then(Value::as_str)
}

/// Content fragment of a `MESSAGE` event, if that is what `event` is
fn message_content(event: &Value) -> Option<&str> {
    if event_type(event) != Some("MESSAGE") {
        return None;
    }
    event.get("content").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            message: "scrape the listings".to_string(),
            session_id: "s-1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["message"], "scrape the listings");
        assert_eq!(json["session_id"], "s-1");
    }

    #[test]
    fn test_fresh_session_per_client() {
        let a = AgentClient::new("http://127.0.0.1:8000");
        let b = AgentClient::new("http://127.0.0.1:8000");
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_message_content_extraction() {
        let event = serde_json::json!({"type": "MESSAGE", "content": "hello"});
        assert_eq!(message_content(&event), Some("hello"));

        let task = serde_json::json!({"type": "TASK_UPDATE", "content": "x"});
        assert_eq!(message_content(&task), None);

        let bare = serde_json::json!({"content": "x"});
        assert_eq!(message_content(&bare), None);
    }

    #[tokio::test]
    async fn test_reply_assembly_from_stream() {
        use bytes::Bytes;
        use futures_util::stream;

        // Same assembly path send_chat uses, driven directly
        let mut router = EventRouter::new();
        let mut reply = String::new();
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(
                b"data: {\"type\":\"MESSAGE\",\"content\":\"Starting the \"}\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"type\":\"TASK_UPDATE\",\"task_id\":\"t1\",\"task_type\":\"crawl\",\"status\":\"running\",\"progress\":10}\ndata: {\"type\":\"MESSAGE\",\"content\":\"crawl now.\"}\n",
            )),
        ];
        decode_stream(stream::iter(chunks), |event| {
            router.route(&event);
            if let Some(content) = message_content(&event) {
                reply.push_str(content);
            }
        })
        .await
        .unwrap();

        assert_eq!(reply, "Starting the crawl now.");
    }
}
