use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::message::{Block, ChatMessage};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Slack API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Slack API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Slack API error: {code}")]
    NotAcknowledged { code: String },
}

/// Delivery acknowledgment returned by the chat sink.
#[derive(Debug, Clone, Deserialize)]
pub struct PostAck {
    pub ok: bool,
    pub error: Option<String>,
    /// Timestamp id of the posted message.
    pub ts: Option<String>,
}

/// Destination for formatted chat messages. One attempt per call, no retries.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn post(&self, message: &ChatMessage) -> Result<PostAck, DeliveryError>;
}

/// Posts to a single Slack channel through `chat.postMessage`.
pub struct SlackNotifier {
    client: reqwest::Client,
    base_url: String,
    token: String,
    channel: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

impl SlackNotifier {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ChatSink for SlackNotifier {
    #[instrument(skip_all, fields(blocks = message.blocks.len()))]
    async fn post(&self, message: &ChatMessage) -> Result<PostAck, DeliveryError> {
        let body = PostMessage {
            channel: &self.channel,
            text: &message.text,
            blocks: &message.blocks,
        };

        debug!(channel = %self.channel, "posting message");
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let ack = response.json::<PostAck>().await?;
        if !ack.ok {
            return Err(DeliveryError::NotAcknowledged {
                code: ack.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        info!(ts = ?ack.ts, "message sent to Slack");
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> ChatMessage {
        ChatMessage {
            text: "You have 1 open PR(s) waiting for reviews".to_string(),
            blocks: vec![Block::header("Header"), Block::Divider],
        }
    }

    #[tokio::test]
    async fn test_post_sends_channel_text_and_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("Authorization", "Bearer xoxb-test"))
            .and(body_partial_json(serde_json::json!({
                "channel": "C123",
                "text": "You have 1 open PR(s) waiting for reviews",
                "blocks": [
                    { "type": "header", "text": { "type": "plain_text", "text": "Header", "emoji": true } },
                    { "type": "divider" }
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "channel": "C123", "ts": "1700000000.000100" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "xoxb-test", "C123");
        let ack = notifier.post(&message()).await.unwrap();
        assert!(ack.ok);
        assert_eq!(ack.ts.as_deref(), Some("1700000000.000100"));
    }

    #[tokio::test]
    async fn test_post_not_acknowledged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": false, "error": "channel_not_found" })),
            )
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "xoxb-test", "C404");
        match notifier.post(&message()).await {
            Err(DeliveryError::NotAcknowledged { code }) => assert_eq!(code, "channel_not_found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "xoxb-test", "C123");
        assert!(matches!(
            notifier.post(&message()).await,
            Err(DeliveryError::Status { status: 500, .. })
        ));
    }
}
