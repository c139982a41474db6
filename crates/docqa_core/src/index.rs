//! In-memory nearest-neighbour index over chunk embeddings.

use crate::domain::Chunk;
use crate::ports::{PortError, PortResult};

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// A chunk returned by a similarity query, with its cosine score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// An immutable, exhaustive-scan vector index for a single document.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    source_tag: String,
    dimension: usize,
    entries: Vec<IndexedChunk>,
}

impl DocumentIndex {
    /// An index for a document that produced no text.
    pub fn empty(source_tag: impl Into<String>) -> Self {
        Self {
            source_tag: source_tag.into(),
            dimension: 0,
            entries: Vec::new(),
        }
    }

    /// Builds an index from chunks and their embeddings. `embeddings` must be parallel
    /// with `chunks` and every vector must have the same dimension.
    pub fn from_embeddings(
        source_tag: impl Into<String>,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> PortResult<Self> {
        if chunks.len() != embeddings.len() {
            return Err(PortError::Unexpected(format!(
                "Embedding count mismatch: {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if embeddings.iter().any(|e| e.len() != dimension || e.is_empty()) {
            return Err(PortError::Unexpected(
                "Embeddings have inconsistent or zero dimensions".to_string(),
            ));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Ok(Self {
            source_tag: source_tag.into(),
            dimension,
            entries,
        })
    }

    pub fn source_tag(&self) -> &str {
        &self.source_tag
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns up to `k` chunks ranked by cosine similarity, most relevant first.
    /// Ties keep insertion order.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // sort_by is stable, so equal scores stay in document order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(score, e)| ScoredChunk {
                chunk: e.chunk.clone(),
                score,
            })
            .collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
