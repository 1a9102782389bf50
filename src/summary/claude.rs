use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::SummarizationError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token ceiling for one executive summary.
pub const MAX_TOKENS: u32 = 1000;

/// Single-turn text completion.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as one user message and return the first text block verbatim.
    async fn complete(&self, prompt: &str) -> Result<String, SummarizationError>;
}

/// Anthropic Messages API client.
pub struct ClaudeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    #[instrument(skip_all, fields(prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, SummarizationError> {
        debug!(model = %self.model, "requesting completion");
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummarizationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<MessagesResponse>().await?;
        let text = body
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(SummarizationError::EmptyCompletion)?;
        debug!(chars = text.len(), "received completion");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-haiku-latest",
                "max_tokens": 1000,
                "messages": [{ "role": "user", "content": "Summarize" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [
                    { "type": "text", "text": "All quiet this week." },
                    { "type": "text", "text": "ignored" }
                ],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(server.uri(), "sk-test", "claude-3-5-haiku-latest");
        let text = client.complete("Summarize").await.unwrap();
        assert_eq!(text, "All quiet this week.");
    }

    #[tokio::test]
    async fn test_complete_skips_non_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    { "type": "thinking", "thinking": "..." },
                    { "type": "text", "text": "Summary" }
                ]
            })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(server.uri(), "sk-test", "m");
        assert_eq!(client.complete("p").await.unwrap(), "Summary");
    }

    #[tokio::test]
    async fn test_complete_empty_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(server.uri(), "sk-test", "m");
        assert!(matches!(
            client.complete("p").await,
            Err(SummarizationError::EmptyCompletion)
        ));
    }

    #[tokio::test]
    async fn test_complete_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let client = ClaudeClient::new(server.uri(), "bad", "m");
        match client.complete("p").await {
            Err(SummarizationError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
