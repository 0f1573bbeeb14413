use async_trait::async_trait;
use tracing::info;

use crate::ai::embeddings::EmbeddingClient;
use crate::db::{self, DbPool};
use crate::error::ApiError;
use crate::models::KnowledgeChunk;

/// Source of knowledge-base context for the generation pipeline. The
/// pipeline only needs this one operation, which keeps it mockable.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn find_relevant_chunks(&self, query: &str) -> Result<Vec<KnowledgeChunk>, ApiError>;
}

/// Embeds a query and asks the storage layer for the nearest chunks.
///
/// An embedding failure propagates; there is no partial result. A store
/// error propagates too — "query failed" and "no matches" are different
/// outcomes, and only the latter is an empty success. Callers that can
/// tolerate missing context make that call themselves.
pub struct Retriever {
    embeddings: EmbeddingClient,
    pool: DbPool,
    top_k: i32,
    min_similarity: f64,
}

impl Retriever {
    pub fn new(embeddings: EmbeddingClient, pool: DbPool, top_k: i32, min_similarity: f64) -> Self {
        Self {
            embeddings,
            pool,
            top_k,
            min_similarity,
        }
    }
}

#[async_trait]
impl ContextSource for Retriever {
    async fn find_relevant_chunks(&self, query: &str) -> Result<Vec<KnowledgeChunk>, ApiError> {
        let preview: String = query.chars().take(50).collect();
        info!(query = %preview, "embedding retrieval query");

        let embedding = self.embeddings.generate_embedding(query).await?;
        let chunks =
            db::match_knowledge_chunks(&self.pool, &embedding, self.min_similarity, self.top_k)
                .await?;

        if chunks.is_empty() {
            info!("no knowledge chunks met the similarity threshold");
        } else {
            info!(count = chunks.len(), "knowledge chunks retrieved");
        }

        Ok(chunks)
    }
}
