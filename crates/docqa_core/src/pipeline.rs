//! crates/docqa_core/src/pipeline.rs
//!
//! Wires extraction, indexing and answering around the single document slot.

use crate::domain::AnswerOutcome;
use crate::engine::AnswerEngine;
use crate::index::DocumentIndex;
use crate::indexer::ChunkIndexer;
use crate::ports::{PortResult, TextExtractionService};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

//=========================================================================================
// DocumentSlot
//=========================================================================================

/// Holds the most recently indexed document.
///
/// There is exactly one slot. `install` publishes a fully built index with a
/// single pointer swap, and `current` hands out a snapshot that stays valid
/// even if another upload replaces the slot afterwards.
#[derive(Default)]
pub struct DocumentSlot {
    current: RwLock<Option<Arc<DocumentIndex>>>,
}

impl DocumentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the installed index, returning the previous one.
    pub fn install(&self, index: DocumentIndex) -> Option<Arc<DocumentIndex>> {
        let index = Arc::new(index);
        self.current.write().replace(index)
    }

    pub fn current(&self) -> Option<Arc<DocumentIndex>> {
        self.current.read().clone()
    }
}

//=========================================================================================
// QaPipeline
//=========================================================================================

/// Summary of a processed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source_tag: String,
    pub extracted_chars: usize,
    pub chunk_count: usize,
}

pub struct QaPipeline {
    extractor: Arc<dyn TextExtractionService>,
    indexer: ChunkIndexer,
    engine: AnswerEngine,
    slot: DocumentSlot,
}

impl QaPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractionService>,
        indexer: ChunkIndexer,
        engine: AnswerEngine,
    ) -> Self {
        Self {
            extractor,
            indexer,
            engine,
            slot: DocumentSlot::new(),
        }
    }

    pub fn slot(&self) -> &DocumentSlot {
        &self.slot
    }

    /// Extracts, chunks and embeds an uploaded file, then installs it as the
    /// current document. The previous document stays installed until the new
    /// index is complete; if indexing fails it is left in place.
    pub async fn ingest(&self, file_bytes: &[u8], source_tag: &str) -> PortResult<IngestReport> {
        let text = self.extractor.extract_text(file_bytes).await;
        if text.trim().is_empty() {
            warn!("No text extracted from '{}'.", source_tag);
        }

        let index = self.indexer.build(&text, source_tag).await?;
        let report = IngestReport {
            source_tag: source_tag.to_string(),
            extracted_chars: text.chars().count(),
            chunk_count: index.len(),
        };

        if let Some(previous) = self.slot.install(index) {
            info!("Replaced previously indexed document '{}'.", previous.source_tag());
        }
        Ok(report)
    }

    /// Answers against whichever document is installed when the call starts.
    pub async fn ask(&self, question: &str) -> PortResult<AnswerOutcome> {
        let snapshot = self.slot.current();
        self.engine.answer(question, snapshot.as_deref()).await
    }
}
