use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::ai::breaker::CircuitState;
use crate::ai::providers::{
    AnthropicProvider, LlmProvider, LocalMode, LocalProvider, ManagedProvider, OpenAiProvider,
    TaskOptions,
};
use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Analyze,
    GenerateDraft,
    Summarize,
    /// Embeddings are produced by the dedicated `EmbeddingClient`; routing
    /// them through the generation pool is a programming error and fails
    /// fast instead of silently picking a chat backend.
    Embedding,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskType::Analyze => "ANALYZE",
            TaskType::GenerateDraft => "GENERATE_DRAFT",
            TaskType::Summarize => "SUMMARIZE",
            TaskType::Embedding => "EMBEDDING",
        };
        f.write_str(name)
    }
}

/// Seam for the generation pool, so the pipeline can be driven by a test
/// double without any HTTP backend.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn execute_task(
        &self,
        task: TaskType,
        prompt: &str,
        options: TaskOptions,
    ) -> Result<String, ApiError>;
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub circuit: CircuitState,
    pub failures: u32,
}

/// Owns the wrapped providers and picks one per task. Constructed once in
/// the composition root and shared across all requests, so the breakers act
/// as process-wide guards.
pub struct AiManager {
    prefer_local: bool,
    local: ManagedProvider,
    anthropic: ManagedProvider,
    openai: ManagedProvider,
}

impl AiManager {
    pub fn from_config(config: &Config, client: Client) -> Self {
        let timeout = Duration::from_millis(config.ai_request_timeout_ms);
        let half_open_after = Duration::from_millis(config.breaker_half_open_after_ms);

        let wrap = |provider: Arc<dyn LlmProvider>| {
            ManagedProvider::new(
                provider,
                timeout,
                config.breaker_max_failures,
                half_open_after,
            )
        };

        let local = wrap(Arc::new(LocalProvider::new(
            client.clone(),
            config.local_llm_base_url.clone(),
            config.local_llm_api_key.clone(),
            config.local_llm_model.clone(),
            LocalMode::parse(&config.local_llm_mode),
        )));
        let anthropic = wrap(Arc::new(AnthropicProvider::new(
            client.clone(),
            config.anthropic_api_key.clone(),
            config.anthropic_model.clone(),
        )));
        let openai = wrap(Arc::new(OpenAiProvider::new(
            client,
            &config.openai_base_url,
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )));

        Self {
            prefer_local: config.prefer_local,
            local,
            anthropic,
            openai,
        }
    }

    fn provider_for(&self, task: TaskType) -> Result<&ManagedProvider, ApiError> {
        if task == TaskType::Embedding {
            return Err(ApiError::NotImplemented(
                "embedding tasks are served by the dedicated embedding client".to_string(),
            ));
        }
        if self.prefer_local {
            return Ok(&self.local);
        }
        match task {
            TaskType::GenerateDraft => Ok(&self.anthropic),
            TaskType::Analyze | TaskType::Summarize => Ok(&self.openai),
            TaskType::Embedding => unreachable!("handled above"),
        }
    }

    /// Breaker state per provider, for the health endpoint. Reads in-memory
    /// state only; no network probes.
    pub fn health(&self) -> Vec<ProviderStatus> {
        [&self.local, &self.anthropic, &self.openai]
            .into_iter()
            .map(|provider| ProviderStatus {
                provider: provider.name().to_string(),
                circuit: provider.circuit_state(),
                failures: provider.failures(),
            })
            .collect()
    }
}

#[async_trait]
impl TaskRunner for AiManager {
    async fn execute_task(
        &self,
        task: TaskType,
        prompt: &str,
        options: TaskOptions,
    ) -> Result<String, ApiError> {
        let provider = self.provider_for(task)?;
        info!(
            task = %task,
            provider = provider.name(),
            prompt_len = prompt.len(),
            "executing ai task"
        );

        match provider.generate(prompt, &options).await {
            Ok(response) => {
                info!(task = %task, response_len = response.len(), "ai task completed");
                Ok(response)
            }
            Err(err) => {
                error!(task = %task, provider = provider.name(), error = %err, "ai task failed");
                Err(err)
            }
        }
    }
}
