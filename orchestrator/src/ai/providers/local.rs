use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::openai::post_chat_completions;
use super::{LlmProvider, TaskOptions};
use crate::error::ApiError;

/// Wire protocol spoken by the self-hosted endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMode {
    /// OpenAI-compatible `/chat/completions` (OpenWebUI, Ollama, vLLM, ...).
    OpenAi,
    /// llama.cpp server `/completion`.
    LlamaCpp,
}

impl LocalMode {
    pub fn parse(mode: &str) -> Self {
        match mode.to_lowercase().as_str() {
            "llamacpp" => LocalMode::LlamaCpp,
            _ => LocalMode::OpenAi,
        }
    }
}

/// Self-hosted LLM provider. The base URL is optional configuration; a call
/// without one fails rather than falling through to a hosted backend.
pub struct LocalProvider {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
    model: String,
    mode: LocalMode,
}

impl LocalProvider {
    pub fn new(
        client: Client,
        base_url: Option<String>,
        api_key: Option<String>,
        model: String,
        mode: LocalMode,
    ) -> Self {
        Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            api_key,
            model,
            mode,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    stream: bool,
    temperature: f32,
    stop: Vec<&'a str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LlmProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, prompt: &str, options: &TaskOptions) -> Result<String, ApiError> {
        let Some(base_url) = self.base_url.as_deref() else {
            return Err(ApiError::Upstream(
                "LOCAL_LLM_BASE_URL is not configured".to_string(),
            ));
        };

        match self.mode {
            LocalMode::OpenAi => {
                post_chat_completions(
                    &self.client,
                    base_url,
                    self.api_key.as_deref(),
                    &self.model,
                    prompt,
                    options,
                )
                .await
            }
            LocalMode::LlamaCpp => {
                let body = CompletionRequest {
                    prompt,
                    stream: false,
                    temperature: options.temperature,
                    stop: vec!["</s>"],
                };

                let response = self
                    .client
                    .post(format!("{base_url}/completion"))
                    .json(&body)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    error!(%status, body = %text, "llama.cpp completion call failed");
                    return Err(ApiError::Upstream(format!(
                        "llama.cpp completion returned {status}"
                    )));
                }

                let parsed: CompletionResponse = response.json().await.map_err(|err| {
                    ApiError::Upstream(format!("invalid llama.cpp payload: {err}"))
                })?;

                Ok(parsed.content.trim().to_string())
            }
        }
    }
}
