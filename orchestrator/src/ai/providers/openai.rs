use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{LlmProvider, TaskOptions, SYSTEM_PERSONA};
use crate::error::ApiError;

/// Hosted OpenAI-compatible chat-completions provider. Also reused by the
/// local provider's `openai` wire mode, since OpenWebUI, Ollama, vLLM and
/// llama-cpp's OpenAI gateway all speak the same shape.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// One `POST {base}/chat/completions` round trip, normalized to a plain
/// string. Shared between the hosted and local providers.
pub(super) async fn post_chat_completions(
    client: &Client,
    base_url: &str,
    api_key: Option<&str>,
    model: &str,
    prompt: &str,
    options: &TaskOptions,
) -> Result<String, ApiError> {
    let body = ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PERSONA,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        stream: false,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    let mut request = client
        .post(format!("{}/chat/completions", base_url.trim_end_matches('/')))
        .json(&body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key.trim());
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        error!(%status, body = %text, "chat completions call failed");
        return Err(ApiError::Upstream(format!(
            "chat completions returned {status}"
        )));
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|err| ApiError::Upstream(format!("invalid chat completions payload: {err}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default();

    Ok(content.trim().to_string())
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, options: &TaskOptions) -> Result<String, ApiError> {
        post_chat_completions(
            &self.client,
            &self.base_url,
            self.api_key.as_deref(),
            &self.model,
            prompt,
            options,
        )
        .await
    }
}
