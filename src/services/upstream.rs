//! Client for the upstream text-generation gateway.
//!
//! Speaks the OpenAI-compatible chat-completions shape: one system message,
//! one user message, a temperature. A single attempt is made per call.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::NO_CONTENT_FALLBACK;
use crate::domain::PromptBundle;

/// What gets sent upstream for one draft
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: PromptBundle,
    pub temperature: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream rate limited the request")]
    RateLimited,
    #[error("upstream credits exhausted")]
    CreditsExhausted,
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("upstream call timed out")]
    Timeout,
    #[error("upstream transport error: {0}")]
    Transport(reqwest::Error),
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e)
        }
    }
}

/// Anything that can turn a prompt pair into generated text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, UpstreamError>;
}

#[derive(Clone)]
pub struct ChatCompletionsClient {
    url: String,
    model: String,
    http: Client,
}

impl ChatCompletionsClient {
    pub fn new(url: &str, model: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            model: model.to_string(),
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl GenerationBackend for ChatCompletionsClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, UpstreamError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.prompt.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt.user_prompt,
                },
            ],
            temperature: request.temperature,
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "upstream gateway error");
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => UpstreamError::CreditsExhausted,
                _ => UpstreamError::Status { status, body: text },
            });
        }

        let data: ChatCompletionResponse = resp.json().await?;
        let text = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_else(|| NO_CONTENT_FALLBACK.to_string());

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::{Value, json};

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: PromptBundle {
                system_prompt: "system text".to_string(),
                user_prompt: "user text".to_string(),
            },
            temperature: 0.3,
        }
    }

    fn client(url: &str) -> ChatCompletionsClient {
        ChatCompletionsClient::new(url, "test-model", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_sends_messages_and_reads_first_choice() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").unwrap().to_str().unwrap(),
                    "Bearer sk-test"
                );
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "system text");
                assert_eq!(body["messages"][1]["role"], "user");
                assert_eq!(body["messages"][1]["content"], "user text");
                assert_eq!(body["temperature"], 0.3);
                Json(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "Dear counsel," } },
                        { "message": { "role": "assistant", "content": "ignored" } }
                    ]
                }))
            }),
        );
        let url = spawn_stub(app).await;

        let text = client(&url).generate("sk-test", &request()).await.unwrap();
        assert_eq!(text, "Dear counsel,");
    }

    #[tokio::test]
    async fn test_missing_content_falls_back() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let url = spawn_stub(app).await;

        let text = client(&url).generate("sk-test", &request()).await.unwrap();
        assert_eq!(text, NO_CONTENT_FALLBACK);
    }

    #[tokio::test]
    async fn test_status_classification() {
        let app = Router::new()
            .route(
                "/limited/v1/chat/completions",
                post(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/broke/v1/chat/completions",
                post(|| async { (axum::http::StatusCode::PAYMENT_REQUIRED, "no credits") }),
            )
            .route(
                "/down/v1/chat/completions",
                post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "bad gateway") }),
            );
        let base = spawn_stub(app).await;
        let base = base.trim_end_matches("/v1/chat/completions");

        let err = client(&format!("{}/limited/v1/chat/completions", base))
            .generate("sk-test", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::RateLimited));

        let err = client(&format!("{}/broke/v1/chat/completions", base))
            .generate("sk-test", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::CreditsExhausted));

        let err = client(&format!("{}/down/v1/chat/completions", base))
            .generate("sk-test", &request())
            .await
            .unwrap_err();
        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let url = spawn_stub(app).await;

        let client =
            ChatCompletionsClient::new(&url, "test-model", Duration::from_millis(100)).unwrap();
        let err = client.generate("sk-test", &request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout));
    }
}
