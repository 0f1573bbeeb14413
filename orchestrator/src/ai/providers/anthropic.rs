use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{LlmProvider, TaskOptions};
use crate::error::ApiError;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages API provider. Favored for draft generation because of
/// its strict JSON adherence.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl AnthropicProvider {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
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
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str, options: &TaskOptions) -> Result<String, ApiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ApiError::Upstream(
                "ANTHROPIC_API_KEY is not configured".to_string(),
            ));
        };

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key.trim())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            error!(%status, body = %text, "anthropic messages call failed");
            return Err(ApiError::Upstream(format!(
                "anthropic messages returned {status}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Upstream(format!("invalid anthropic payload: {err}")))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(ApiError::Upstream(
                "anthropic response missing text content".to_string(),
            ));
        }

        Ok(text.trim().to_string())
    }
}
