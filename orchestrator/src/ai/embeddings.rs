use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::Config;
use crate::error::ApiError;

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// The configured dimension must match the corpus-ingestion model: a vector
/// of any other length is rejected rather than compared, because embeddings
/// from different models are never in the same space. Input length limits
/// are delegated to the API and surface as upstream errors. No retry here;
/// retry policy belongs to callers.
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimension: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            dimension,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            client,
            &config.embeddings_base_url,
            config.embeddings_api_key.clone(),
            config.embeddings_model.clone(),
            config.embedding_dim,
        )
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::Validation(
                "embedding input must not be empty".to_string(),
            ));
        }

        let body = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.trim());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            error!(%status, body = %text, "embedding call failed");
            return Err(ApiError::Upstream(format!(
                "embeddings endpoint returned {status}"
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Upstream(format!("invalid embeddings payload: {err}")))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| ApiError::Upstream("embeddings response contained no vectors".to_string()))?;

        self.ensure_dimension(vector)
    }

    /// A vector of the wrong length came from a different model and is not
    /// comparable to the corpus; reject it instead of computing similarity.
    fn ensure_dimension(&self, vector: Vec<f32>) -> Result<Vec<f32>, ApiError> {
        if vector.len() != self.dimension {
            return Err(ApiError::Upstream(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        Ok(vector)
    }
}
