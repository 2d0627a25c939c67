use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 300;
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("empty input")]
    EmptyInput,
    #[error("misconfigured: {0}")]
    Misconfigured(&'static str),
    #[error("model call timed out")]
    Timeout,
    #[error("connection failure: {0}")]
    Connection(String),
    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    MalformedResponse(String),
    #[error("model returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Connection(err.to_string())
        }
    }
}

/// Single-shot access to the chat model. Implementations never retry; a
/// failed call is final for the operation that made it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn call(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ModelRef<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct RequestOptions<'a> {
    model: ModelRef<'a>,
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestData<'a> {
    temperature: f32,
    #[serde(rename = "max_tokens")]
    max_tokens: u32,
    data_sources: Vec<JsonValue>,
    messages: &'a [ChatMessage],
    options: RequestOptions<'a>,
}

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    data: RequestData<'a>,
}

#[derive(Clone)]
pub struct HttpLlmGateway {
    client: Client,
    config: LlmConfig,
}

impl HttpLlmGateway {
    pub fn new(config: LlmConfig, client: Client) -> Self {
        Self { client, config }
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Result<JsonValue, LlmError> {
        let prompt = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let envelope = RequestEnvelope {
            data: RequestData {
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
                data_sources: Vec::new(),
                messages,
                options: RequestOptions {
                    model: ModelRef {
                        id: &self.config.model_id,
                    },
                    prompt,
                },
            },
        };
        serde_json::to_value(envelope).map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn call(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::EmptyInput);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::Misconfigured("missing API key"))?;
        let api_url = self
            .config
            .api_url
            .as_deref()
            .ok_or(LlmError::Misconfigured("missing API URL"))?;

        let body = self.request_body(messages)?;
        let res = self
            .client
            .post(api_url)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(CALL_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        extract_content(&body)
    }
}

/// Pulls the completion text out of a `{"data": "<text>"}` response.
pub fn extract_content(body: &JsonValue) -> Result<String, LlmError> {
    let data = body
        .get("data")
        .ok_or_else(|| LlmError::MalformedResponse("missing data field".to_string()))?;
    let text = data
        .as_str()
        .ok_or_else(|| LlmError::MalformedResponse("data field is not a string".to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text.to_string())
}
