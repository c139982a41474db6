//! services/api/src/adapters/embeddings.rs
//!
//! This module contains the adapter for the embedding model.
//! It implements the `EmbeddingService` port from the `core` crate.

use crate::adapters::retry::{ModelCallError, RetryPolicy};
use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use docqa_core::ports::{EmbeddingService, PortError, PortResult};

/// Texts per embeddings request.
const BATCH_SIZE: usize = 64;

/// An adapter that implements `EmbeddingService` using an OpenAI-compatible embeddings API.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry,
        }
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(batch.to_vec())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

            let client = &self.client;
            let response = self
                .retry
                .run("embedding", move || {
                    let request = request.clone();
                    async move {
                        client
                            .embeddings()
                            .create(request)
                            .await
                            .map_err(ModelCallError::from)
                    }
                })
                .await?;

            // The API reports each vector's position in the batch; don't rely on response order.
            let mut data = response.data;
            data.sort_by_key(|e| e.index);
            if data.len() != batch.len() {
                return Err(PortError::Unexpected(format!(
                    "Embedding API returned {} vectors for {} inputs",
                    data.len(),
                    batch.len()
                )));
            }
            all_embeddings.extend(data.into_iter().map(|e| e.embedding));
        }

        Ok(all_embeddings)
    }
}
