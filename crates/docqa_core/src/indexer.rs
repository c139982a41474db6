//! crates/docqa_core/src/indexer.rs
//!
//! Turns extracted document text into a queryable `DocumentIndex` and runs
//! similarity queries against it, using an `EmbeddingService` for both sides.

use crate::chunking::{split_text, ChunkingConfig};
use crate::domain::Chunk;
use crate::index::DocumentIndex;
use crate::ports::{EmbeddingService, PortResult};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ChunkIndexer {
    embedder: Arc<dyn EmbeddingService>,
    chunking: ChunkingConfig,
}

impl ChunkIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingService>, chunking: ChunkingConfig) -> Self {
        Self { embedder, chunking }
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    /// Chunks and embeds `text`. Empty text yields an empty index without
    /// touching the embedding model.
    pub async fn build(&self, text: &str, source_tag: &str) -> PortResult<DocumentIndex> {
        let chunks = split_text(text, &self.chunking, source_tag);
        if chunks.is_empty() {
            info!("Document '{}' has no extractable text; installing an empty index.", source_tag);
            return Ok(DocumentIndex::empty(source_tag));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        let index = DocumentIndex::from_embeddings(source_tag, chunks, embeddings)?;

        info!(
            "Indexed '{}': {} chunks, {} dimensions.",
            source_tag,
            index.len(),
            index.dimension()
        );
        Ok(index)
    }

    /// Returns up to `k` chunks of `index` most similar to `question`.
    pub async fn query(
        &self,
        index: &DocumentIndex,
        question: &str,
        k: usize,
    ) -> PortResult<Vec<Chunk>> {
        if index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(question).await?;
        let hits = index.search(&query_embedding, k);
        debug!(
            "Retrieved {} chunks for question (top score {:?}).",
            hits.len(),
            hits.first().map(|h| h.score)
        );
        Ok(hits.into_iter().map(|h| h.chunk).collect())
    }
}
